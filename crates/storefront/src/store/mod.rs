//! Persistent key-value storage.
//!
//! Every container persists its state as one JSON document under a named
//! key. The store is synchronous and string-valued: reads and writes happen
//! inline in the operation that needs them.
//!
//! # Keys
//!
//! See [`keys`] for the full layout.

pub mod file;
pub mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is empty or contains characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be deserialized.
    #[error("failed to decode value for key {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lock guarding in-memory state was poisoned by a panic.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the key is invalid or the read fails.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the key is invalid or the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the key is invalid or the delete fails.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys currently present, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the listing fails.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Shared handle to a store, as held by the state containers.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Store key layout.
pub mod keys {
    use tindahan_core::UserId;

    /// Serialized array of cart line items.
    pub const CART: &str = "cart";

    /// Serialized array of cart activity records, newest first.
    pub const CART_ACTIVITIES: &str = "cartActivities";

    /// The signed-in user, if any.
    pub const CURRENT_USER: &str = "currentUser";

    /// Registered accounts with their password hashes.
    pub const ACCOUNTS: &str = "accounts";

    /// Outstanding password reset tokens.
    pub const PASSWORD_RESETS: &str = "passwordResets";

    /// Per-user wishlist key.
    #[must_use]
    pub fn wishlist(user_id: &UserId) -> String {
        format!("wishlist-{user_id}")
    }
}

/// Check that a key is safe to use as a file name on every platform.
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` when the key is empty, starts with `.`,
/// or contains anything other than ASCII alphanumerics, `_`, `-` and `.`.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `StoreError::Decode` if the stored value is not valid JSON for `T`,
/// or any error from the underlying store.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: key.to_owned(),
                source,
            })
        })
        .transpose()
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns `StoreError::Encode` if `value` cannot be serialized, or any error
/// from the underlying store.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw)
}

/// Read a JSON value during hydration.
///
/// Corrupt data is logged and treated as absent so one bad key cannot stop a
/// session from mounting. Other store errors still propagate.
///
/// # Errors
///
/// Returns any non-decode error from the underlying store.
pub fn hydrate_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match load_json(store, key) {
        Err(StoreError::Decode { key, source }) => {
            tracing::warn!(%key, error = %source, "Discarding malformed stored value");
            Ok(None)
        }
        other => other,
    }
}

/// Read a stored JSON array during hydration, one element at a time.
///
/// Elements that `decode` rejects are logged and dropped; the rest are
/// kept in order. A value that is not an array at all is treated as absent,
/// as in [`hydrate_json`].
///
/// # Errors
///
/// Returns any non-decode error from the underlying store.
pub fn hydrate_lines<T, F>(
    store: &dyn KeyValueStore,
    key: &str,
    mut decode: F,
) -> Result<Vec<T>, StoreError>
where
    F: FnMut(serde_json::Value) -> Result<T, serde_json::Error>,
{
    let Some(raw) = hydrate_json::<Vec<serde_json::Value>>(store, key)? else {
        return Ok(Vec::new());
    };

    let stored = raw.len();
    let lines: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            decode(value)
                .map_err(|error| {
                    tracing::warn!(%key, index, %error, "Dropping malformed stored line");
                })
                .ok()
        })
        .collect();

    if lines.len() != stored {
        tracing::warn!(%key, stored, kept = lines.len(), "Kept decodable stored lines");
    }
    Ok(lines)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("cart").is_ok());
        assert!(validate_key("wishlist-3f2a_b.c").is_ok());

        for bad in ["", ".hidden", "../cart", "a/b", "a\\b", "wish list", "ключ"] {
            assert!(
                matches!(validate_key(bad), Err(StoreError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_wishlist_key() {
        let user = tindahan_core::UserId::new("abc-123");
        assert_eq!(keys::wishlist(&user), "wishlist-abc-123");
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        assert_eq!(load_json::<Vec<u32>>(&store, "nums").unwrap(), None);

        save_json(&store, "nums", &[1_u32, 2, 3]).unwrap();
        assert_eq!(
            load_json::<Vec<u32>>(&store, "nums").unwrap(),
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_hydrate_discards_malformed_values() {
        let store = MemoryStore::new();
        store.set("nums", "{not json").unwrap();

        assert!(matches!(
            load_json::<Vec<u32>>(&store, "nums"),
            Err(StoreError::Decode { .. })
        ));
        assert_eq!(hydrate_json::<Vec<u32>>(&store, "nums").unwrap(), None);
    }

    #[test]
    fn test_hydrate_lines_keeps_decodable_elements() {
        let store = MemoryStore::new();
        store.set("nums", r#"[1, "two", 3, -4]"#).unwrap();

        let nums: Vec<u32> = hydrate_lines(&store, "nums", serde_json::from_value).unwrap();
        assert_eq!(nums, vec![1, 3]);

        store.set("nums", r#"{"not":"a list"}"#).unwrap();
        let nums: Vec<u32> = hydrate_lines(&store, "nums", serde_json::from_value).unwrap();
        assert!(nums.is_empty());

        let missing: Vec<u32> = hydrate_lines(&store, "missing", serde_json::from_value).unwrap();
        assert!(missing.is_empty());
    }
}
