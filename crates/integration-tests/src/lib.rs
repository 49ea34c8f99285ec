//! Integration tests for Tindahan.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tindahan-integration-tests
//!
//! # Property tests only
//! cargo test -p tindahan-integration-tests --test properties
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart behaviour across mounts and sign-in
//! - `wishlist_scoping` - Per-user wishlist isolation
//! - `auth_flow` - Accounts, password reset and admin access
//! - `file_store` - Directory-backed persistence
//! - `properties` - Randomized checks of the cart line invariants

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tempfile::TempDir;

use tindahan_core::ProductId;
use tindahan_storefront::catalog::Catalog;
use tindahan_storefront::config::StorefrontConfig;
use tindahan_storefront::models::{CartItem, WishlistItem};
use tindahan_storefront::notify::RecordingNotifier;
use tindahan_storefront::session::StorefrontSession;
use tindahan_storefront::store::{FileStore, SharedStore};
use tindahan_storefront::{Result, StorefrontError};

/// Admin registration code used by test sessions.
pub const ADMIN_CODE: &str = "k7Qz-4mWp-9xRt";

/// A throwaway data directory plus the pieces needed to mount sessions on it.
pub struct TestContext {
    pub dir: TempDir,
    pub store: SharedStore,
    pub notifier: Arc<RecordingNotifier>,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Create a context over a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or store cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().map_err(|e| StorefrontError::Store(e.into()))?;
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            admin_registration_code: Some(ADMIN_CODE.to_owned().into()),
            ..StorefrontConfig::default()
        };
        let store: SharedStore = Arc::new(FileStore::open(dir.path())?);

        Ok(Self {
            dir,
            store,
            notifier: Arc::new(RecordingNotifier::new()),
            config,
        })
    }

    /// Mount a session over this context's store with the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if hydration fails.
    pub fn mount(&self) -> Result<StorefrontSession> {
        StorefrontSession::mount(
            self.store.clone(),
            self.notifier.clone(),
            Catalog::builtin()?,
            &self.config,
        )
    }

    /// Reopen the data directory as a brand new store, as a fresh process would.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or hydration fails.
    pub fn remount(&self) -> Result<StorefrontSession> {
        let store: SharedStore = Arc::new(FileStore::open(self.dir.path())?);
        StorefrontSession::mount(
            store,
            self.notifier.clone(),
            Catalog::builtin()?,
            &self.config,
        )
    }
}

/// Cart line for a built-in product with default options.
///
/// # Errors
///
/// Returns an error if the product does not exist.
pub fn cart_item(session: &StorefrontSession, id: &str) -> Result<CartItem> {
    Ok(session
        .catalog()
        .require(&ProductId::new(id))?
        .to_cart_item(None, None)?)
}

/// Wishlist entry for a built-in product.
///
/// # Errors
///
/// Returns an error if the product does not exist.
pub fn wishlist_item(session: &StorefrontSession, id: &str) -> Result<WishlistItem> {
    Ok(session
        .catalog()
        .require(&ProductId::new(id))?
        .to_wishlist_item())
}
