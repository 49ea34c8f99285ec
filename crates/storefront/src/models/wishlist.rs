//! Wishlist domain types.

use serde::{Deserialize, Serialize};

use tindahan_core::{Price, ProductId};

use super::CartItem;

/// A saved product. Identity is the product id alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
}

impl WishlistItem {
    /// A single-quantity cart line with no variant selected.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity: 1,
            color: None,
            color_name: None,
            size: None,
        }
    }
}
