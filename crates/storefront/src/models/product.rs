//! Catalog product types.

use serde::{Deserialize, Serialize};

use tindahan_core::{Price, ProductId};

use super::{CartItem, WishlistItem};
use crate::catalog::CatalogError;

/// A color swatch offered for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    /// Machine value stored on cart lines, e.g. `"#1f2937"`.
    pub value: String,
    /// Display name, e.g. `"Charcoal"`.
    pub name: String,
}

/// A product as shown on browsing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    pub image: String,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl Product {
    /// Build a single-quantity cart line for the chosen variant.
    ///
    /// `color` may be given as the swatch value or its name (case-insensitive).
    /// When the product offers options and none is chosen, the first option is
    /// used, as the product page preselects it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidVariant` if a choice is not offered.
    pub fn to_cart_item(
        &self,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<CartItem, CatalogError> {
        let color = match (color, self.colors.first()) {
            (Some(wanted), _) => Some(
                self.colors
                    .iter()
                    .find(|c| c.value == wanted || c.name.eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| self.invalid_variant("color", wanted))?,
            ),
            (None, first) => first,
        };

        let size = match (size, self.sizes.first()) {
            (Some(wanted), _) => Some(
                self.sizes
                    .iter()
                    .find(|s| s.eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| self.invalid_variant("size", wanted))?,
            ),
            (None, first) => first,
        };

        Ok(CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity: 1,
            color: color.map(|c| c.value.clone()),
            color_name: color.map(|c| c.name.clone()),
            size: size.cloned(),
        })
    }

    /// The wishlist entry for this product.
    #[must_use]
    pub fn to_wishlist_item(&self) -> WishlistItem {
        WishlistItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }

    fn invalid_variant(&self, option: &'static str, value: &str) -> CatalogError {
        CatalogError::InvalidVariant {
            product: self.id.clone(),
            option,
            value: value.to_owned(),
        }
    }
}
