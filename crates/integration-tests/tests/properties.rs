//! Property tests for cart line invariants.
//!
//! Properties use randomized add/update sequences to protect the merge
//! invariant: one line per `(id, color, size)` and quantities that add up.
//!
//! Run with: `cargo test -p tindahan-integration-tests --test properties`

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use tindahan_core::{CurrencyCode, Price, ProductId};
use tindahan_storefront::catalog::Catalog;
use tindahan_storefront::config::StorefrontConfig;
use tindahan_storefront::models::CartItem;
use tindahan_storefront::notify::RecordingNotifier;
use tindahan_storefront::session::StorefrontSession;
use tindahan_storefront::store::MemoryStore;

type LineKey = (String, Option<String>, Option<String>);

fn session() -> StorefrontSession {
    StorefrontSession::mount(
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
        Catalog::new(Vec::new()).unwrap(),
        &StorefrontConfig::default(),
    )
    .unwrap()
}

fn line(key: &LineKey) -> CartItem {
    CartItem {
        id: ProductId::new(key.0.clone()),
        name: format!("Item {}", key.0),
        price: Price::from_minor_units(9_900, CurrencyCode::PHP),
        image: String::new(),
        quantity: 1,
        color: key.1.clone(),
        color_name: None,
        size: key.2.clone(),
    }
}

/// Keys drawn from a small space so sequences collide often.
fn line_key() -> impl Strategy<Value = LineKey> {
    (
        prop::sample::select(vec!["1", "2", "3"]),
        prop::option::of(prop::sample::select(vec!["#000", "#fff"])),
        prop::option::of(prop::sample::select(vec!["S", "M"])),
    )
        .prop_map(|(id, color, size)| {
            (
                id.to_owned(),
                color.map(str::to_owned),
                size.map(str::to_owned),
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: repeated adds of one line sum their quantities into one entry.
    #[test]
    fn property_same_line_adds_sum(
        key in line_key(),
        quantities in prop::collection::vec(1_u32..100, 1..20)
    ) {
        let mut session = session();
        for quantity in &quantities {
            session.cart_mut().add_item(line(&key), Some(*quantity)).unwrap();
        }

        let items = session.cart().items();
        prop_assert_eq!(items.len(), 1);
        prop_assert_eq!(items[0].quantity, quantities.iter().sum::<u32>());
    }

    /// PROPERTY: mixed adds never duplicate a line and preserve every quantity.
    #[test]
    fn property_no_duplicate_lines(
        adds in prop::collection::vec((line_key(), 0_u32..10), 0..40)
    ) {
        let mut session = session();
        let mut expected: HashMap<LineKey, u32> = HashMap::new();
        for (key, quantity) in &adds {
            session.cart_mut().add_item(line(key), Some(*quantity)).unwrap();
            if *quantity > 0 {
                *expected.entry(key.clone()).or_default() += quantity;
            }
        }

        let cart = session.cart();
        prop_assert_eq!(cart.items().len(), expected.len());
        for item in cart.items() {
            let key = (item.id.to_string(), item.color.clone(), item.size.clone());
            prop_assert_eq!(Some(&item.quantity), expected.get(&key));
            prop_assert!(item.quantity >= 1);
        }
        prop_assert_eq!(cart.total_items(), expected.values().sum::<u32>());
    }

    /// PROPERTY: a zero quantity update never changes the cart.
    #[test]
    fn property_zero_update_is_noop(
        adds in prop::collection::vec((line_key(), 1_u32..10), 1..20),
        target in line_key()
    ) {
        let mut session = session();
        for (key, quantity) in &adds {
            session.cart_mut().add_item(line(key), Some(*quantity)).unwrap();
        }
        let before = session.cart().items().to_vec();

        let updated = session
            .cart_mut()
            .update_quantity(
                &ProductId::new(target.0.clone()),
                0,
                target.1.as_deref(),
                target.2.as_deref(),
            )
            .unwrap();

        prop_assert_eq!(updated, 0);
        prop_assert_eq!(session.cart().items(), before.as_slice());
    }

    /// PROPERTY: removing a line leaves every non-matching line untouched.
    #[test]
    fn property_remove_leaves_unrelated_lines(
        adds in prop::collection::vec((line_key(), 1_u32..10), 1..20),
        target in line_key()
    ) {
        let mut session = session();
        for (key, quantity) in &adds {
            session.cart_mut().add_item(line(key), Some(*quantity)).unwrap();
        }
        let id = ProductId::new(target.0.clone());
        let unrelated: Vec<CartItem> = session
            .cart()
            .items()
            .iter()
            .filter(|i| !i.matches(&id, target.1.as_deref(), target.2.as_deref()))
            .cloned()
            .collect();

        session
            .cart_mut()
            .remove_item(&id, target.1.as_deref(), target.2.as_deref())
            .unwrap();

        for item in &unrelated {
            prop_assert!(session.cart().items().contains(item));
        }
    }
}
