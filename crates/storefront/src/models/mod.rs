//! Domain models for the storefront.
//!
//! These are the values the state containers own and persist. Field names
//! serialize in camelCase to match the stored layout written by earlier
//! clients.

pub mod cart;
pub mod product;
pub mod user;
pub mod wishlist;

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tindahan_core::{CurrencyCode, Price};

pub use cart::{CartAction, CartActivity, CartItem};
pub use product::{ColorOption, Product};
pub use user::{Account, PasswordReset, User};
pub use wishlist::WishlistItem;

/// Decode one stored line, reading a legacy display-string `price` in
/// `currency` when the string carries no currency symbol.
///
/// # Errors
///
/// Returns a `serde_json::Error` if the price string cannot be parsed or the
/// line does not match `T`.
pub(crate) fn decode_priced_line<T: DeserializeOwned>(
    mut line: Value,
    currency: CurrencyCode,
) -> Result<T, serde_json::Error> {
    let legacy = match line.get("price") {
        Some(Value::String(display)) => {
            Some(Price::parse_display(display, currency).map_err(serde_json::Error::custom)?)
        }
        _ => None,
    };
    if let Some(price) = legacy {
        line["price"] = serde_json::to_value(price)?;
    }
    serde_json::from_value(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_priced_line_uses_store_currency_without_symbol() {
        let line = json!({ "id": 1, "name": "Cap", "price": "19.99", "image": "cap.jpg" });
        let item: WishlistItem = decode_priced_line(line, CurrencyCode::USD).unwrap();
        assert_eq!(item.price, Price::from_minor_units(1999, CurrencyCode::USD));
    }

    #[test]
    fn test_decode_priced_line_keeps_explicit_symbol() {
        let line = json!({ "id": 1, "name": "Cap", "price": "₱1,499", "image": "cap.jpg" });
        let item: WishlistItem = decode_priced_line(line, CurrencyCode::USD).unwrap();
        assert_eq!(item.price, Price::from_minor_units(149_900, CurrencyCode::PHP));
    }

    #[test]
    fn test_decode_priced_line_rejects_unparseable_price() {
        let line = json!({ "id": 1, "name": "Cap", "price": "Free", "image": "cap.jpg" });
        assert!(decode_priced_line::<WishlistItem>(line, CurrencyCode::PHP).is_err());
    }
}
