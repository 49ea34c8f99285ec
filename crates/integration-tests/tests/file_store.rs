//! Integration tests for the directory-backed store.

#![allow(clippy::unwrap_used)]

use tindahan_storefront::store::{FileStore, KeyValueStore, StoreError};

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        store.set("cart", "[]").unwrap();
        store.set("wishlist-u-1", r#"[{"id":"1"}]"#).unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
    assert_eq!(store.keys().unwrap(), vec!["cart", "wishlist-u-1"]);
    assert!(dir.path().join("cart.json").exists());
}

#[test]
fn test_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    for key in ["", "../cart", "a/b", ".hidden", "wishlist-ü"] {
        assert!(
            matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))),
            "key {key:?} should be rejected"
        );
    }
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn test_overwrite_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    store.set("currentUser", "1").unwrap();
    store.set("currentUser", "2").unwrap();
    assert_eq!(store.get("currentUser").unwrap().as_deref(), Some("2"));

    store.remove("currentUser").unwrap();
    store.remove("currentUser").unwrap();
    assert!(store.get("currentUser").unwrap().is_none());
}

#[test]
fn test_stored_layout_is_plain_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    store.set("cartActivities", "[]").unwrap();

    let raw = std::fs::read_to_string(dir.path().join("cartActivities.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.as_array().unwrap().is_empty());
}
