//! Tindahan storefront library.
//!
//! Client-side state for a small storefront: a product catalog, a cart, a
//! per-user wishlist and a local mock of sign-in, all persisted in a
//! key-value store.
//!
//! # Modules
//!
//! - [`store`] - Key-value persistence (in memory or one JSON file per key)
//! - [`notify`] - Toast notifications
//! - [`catalog`] - Read-only product catalog
//! - [`services`] - Auth, cart and wishlist state containers
//! - [`session`] - Mount/close lifecycle tying the containers together
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use tindahan_storefront::catalog::Catalog;
//! use tindahan_storefront::config::StorefrontConfig;
//! use tindahan_storefront::notify::RecordingNotifier;
//! use tindahan_storefront::session::StorefrontSession;
//! use tindahan_storefront::store::MemoryStore;
//!
//! let config = StorefrontConfig::default();
//! let mut session = StorefrontSession::mount(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(RecordingNotifier::new()),
//!     Catalog::builtin()?,
//!     &config,
//! )?;
//!
//! let tee = session.catalog().products()[3].to_cart_item(Some("Olive"), Some("M"))?;
//! session.cart_mut().add_item(tee, Some(2))?;
//! assert_eq!(session.cart().total_items(), 2);
//!
//! session.close()?;
//! # Ok::<(), tindahan_storefront::error::StorefrontError>(())
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod session;
pub mod store;

pub use error::{Result, StorefrontError};
