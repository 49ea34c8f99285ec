//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tindahan_core::{Email, Price, PriceError, ProductId, UserId};

/// One cart line.
///
/// Line identity is `(id, color, size)`: the same product in two colors is
/// two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Exact line identity: id, color and size all equal.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.id == other.id && self.color == other.color && self.size == other.size
    }

    /// Selector match where an unspecified color or size matches anything.
    #[must_use]
    pub fn matches(&self, id: &ProductId, color: Option<&str>, size: Option<&str>) -> bool {
        self.id == *id
            && color.is_none_or(|c| self.color.as_deref() == Some(c))
            && size.is_none_or(|s| self.size.as_deref() == Some(s))
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total does not fit.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.price.checked_mul(self.quantity)
    }

    /// Human-readable variant label, e.g. `"Black / M"`.
    #[must_use]
    pub fn variant_label(&self) -> Option<String> {
        let color = self.color_name.as_deref().or(self.color.as_deref());
        match (color, self.size.as_deref()) {
            (Some(c), Some(s)) => Some(format!("{c} / {s}")),
            (Some(c), None) => Some(c.to_owned()),
            (None, Some(s)) => Some(s.to_owned()),
            (None, None) => None,
        }
    }
}

/// Which mutation produced an activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartAction {
    Add,
    AddAll,
    Remove,
    UpdateQuantity,
}

/// Best-effort log entry describing a cart mutation by a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartActivity {
    pub user_id: UserId,
    pub user_name: String,
    pub email: Email,
    pub timestamp: DateTime<Utc>,
    pub action: CartAction,
    /// Full cart contents after the mutation.
    pub items: Vec<CartItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tindahan_core::CurrencyCode;

    fn shirt(color: Option<&str>, size: Option<&str>) -> CartItem {
        CartItem {
            id: ProductId::new("tee"),
            name: "Tee".to_owned(),
            price: Price::from_minor_units(49_900, CurrencyCode::PHP),
            image: "/img/tee.jpg".to_owned(),
            quantity: 1,
            color: color.map(str::to_owned),
            color_name: None,
            size: size.map(str::to_owned),
        }
    }

    #[test]
    fn test_same_line_requires_exact_variant() {
        let black_m = shirt(Some("#000"), Some("M"));
        assert!(black_m.same_line(&shirt(Some("#000"), Some("M"))));
        assert!(!black_m.same_line(&shirt(Some("#000"), Some("L"))));
        assert!(!black_m.same_line(&shirt(None, Some("M"))));
    }

    #[test]
    fn test_matches_treats_missing_selectors_as_wildcards() {
        let item = shirt(Some("#000"), Some("M"));
        let id = ProductId::new("tee");

        assert!(item.matches(&id, None, None));
        assert!(item.matches(&id, Some("#000"), None));
        assert!(item.matches(&id, None, Some("M")));
        assert!(!item.matches(&id, Some("#fff"), None));
        assert!(!item.matches(&ProductId::new("cap"), None, None));
    }

    #[test]
    fn test_legacy_item_deserializes() {
        let json = r##"{"id":3,"name":"Cap","price":"₱1,499","image":"cap.jpg","quantity":2,"color":"#f00","colorName":"Red"}"##;
        let item: CartItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.id, ProductId::new("3"));
        assert_eq!(item.price.minor_units(), 149_900);
        assert_eq!(item.color_name.as_deref(), Some("Red"));
        assert_eq!(item.size, None);
        assert_eq!(item.variant_label().as_deref(), Some("Red"));
    }

    #[test]
    fn test_line_total() {
        let mut item = shirt(None, None);
        item.quantity = 3;
        assert_eq!(item.line_total().unwrap().minor_units(), 149_700);
    }
}
