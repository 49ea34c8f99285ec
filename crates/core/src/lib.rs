//! Tindahan Core - Shared types library.
//!
//! This crate provides common types used across all Tindahan components:
//! - `storefront` - Cart, wishlist, auth and catalog state containers
//! - `cli` - Command-line front end driving a storefront session
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no clocks.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
