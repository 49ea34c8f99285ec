//! Storefront state containers.
//!
//! # Services
//!
//! - `auth` - Current user, accounts, password reset and admin access
//! - `cart` - Cart line items and the cart activity log
//! - `wishlist` - Per-user saved products

pub mod auth;
pub mod cart;
pub mod wishlist;

pub use auth::{AuthError, AuthState};
pub use cart::CartState;
pub use wishlist::WishlistState;
