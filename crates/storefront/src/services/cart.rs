//! Cart state.
//!
//! The cart is a list of line items keyed by `(id, color, size)`, hydrated
//! once from the `cart` key and rewritten in full after every change. It is
//! not scoped to a user: the same cart survives sign-in and sign-out. The
//! signed-in user is read only to attribute activity records.

use tokio::sync::watch;
use tracing::instrument;

use chrono::Utc;
use tindahan_core::{CurrencyCode, Price, PriceError, ProductId};

use crate::models::{CartAction, CartActivity, CartItem, User, decode_priced_line};
use crate::notify::{SharedNotifier, Toast};
use crate::store::{SharedStore, StoreError, hydrate_json, hydrate_lines, keys, save_json};

/// Maximum number of activity records kept.
pub const MAX_ACTIVITIES: usize = 50;

/// Cart state container.
pub struct CartState {
    store: SharedStore,
    notifier: SharedNotifier,
    identity: watch::Receiver<Option<User>>,
    currency: CurrencyCode,
    items: Vec<CartItem>,
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartState")
            .field("currency", &self.currency)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartState {
    /// Hydrate the cart from the store.
    ///
    /// Lines are decoded one at a time: a line that cannot be read is logged
    /// and dropped while the rest are kept. Legacy price strings without a
    /// currency symbol are read in `currency`. Lines with quantity 0 are
    /// dropped and duplicate lines merged, so the in-memory cart always
    /// upholds the line invariants.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    #[instrument(skip_all)]
    pub fn mount(
        store: SharedStore,
        notifier: SharedNotifier,
        identity: watch::Receiver<Option<User>>,
        currency: CurrencyCode,
    ) -> Result<Self, StoreError> {
        let stored: Vec<CartItem> =
            hydrate_lines(&*store, keys::CART, |line| decode_priced_line(line, currency))?;
        let stored_len = stored.len();
        let items = normalize(stored);
        if items.len() != stored_len {
            tracing::warn!(
                stored = stored_len,
                kept = items.len(),
                "Normalized stored cart lines"
            );
        }
        tracing::debug!(lines = items.len(), "Cart hydrated");

        Ok(Self {
            store,
            notifier,
            identity,
            currency,
            items,
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` (default 1) of a line.
    ///
    /// An existing line with the same `(id, color, size)` has its quantity
    /// increased; otherwise the item is appended with that quantity. The
    /// item's own `quantity` field is ignored. Adding 0 does nothing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_item(&mut self, item: CartItem, quantity: Option<u32>) -> Result<(), StoreError> {
        let quantity = quantity.unwrap_or(1);
        if quantity == 0 {
            return Ok(());
        }

        let mut next = self.items.clone();
        let toast = match merge(&mut next, item, quantity) {
            Merged::Updated { name, quantity } => {
                Toast::success(format!("Updated {name} quantity to {quantity}"))
            }
            Merged::Inserted { name } => Toast::success(format!("{name} added to cart")),
        };

        self.commit(next, Some(CartAction::Add))?;
        self.notifier.notify(toast);
        Ok(())
    }

    /// Add several lines in one step, each with its own `quantity`.
    ///
    /// Lines merge exactly as in [`CartState::add_item`]. The cart is written
    /// once, one toast is shown and one activity recorded. Returns the number
    /// of lines added; items with quantity 0 are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    #[instrument(skip_all, fields(count = items.len()))]
    pub fn add_items(&mut self, items: Vec<CartItem>) -> Result<usize, StoreError> {
        let mut next = self.items.clone();
        let mut added = 0_usize;
        for item in items {
            let quantity = item.quantity;
            if quantity == 0 {
                continue;
            }
            merge(&mut next, item, quantity);
            added += 1;
        }

        if added == 0 {
            return Ok(0);
        }

        self.commit(next, Some(CartAction::AddAll))?;
        let noun = if added == 1 { "item" } else { "items" };
        self.notifier
            .notify(Toast::success(format!("Added {added} {noun} to cart")));
        Ok(added)
    }

    /// Remove the first line matching `id` and, when given, `color`/`size`.
    ///
    /// Returns the removed line. Nothing happens if no line matches.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove_item(
        &mut self,
        id: &ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<Option<CartItem>, StoreError> {
        let Some(position) = self.items.iter().position(|i| i.matches(id, color, size)) else {
            return Ok(None);
        };
        let mut next = self.items.clone();
        let removed = next.remove(position);

        self.commit(next, Some(CartAction::Remove))?;
        self.notifier
            .notify(Toast::success(format!("{} removed from cart", removed.name)));
        Ok(Some(removed))
    }

    /// Set the quantity of every line matching `id` and, when given,
    /// `color`/`size`. Quantities below 1 are ignored.
    ///
    /// Returns the number of lines updated.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &mut self,
        id: &ProductId,
        quantity: u32,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Result<usize, StoreError> {
        if quantity < 1 {
            return Ok(0);
        }

        let mut next = self.items.clone();
        let mut updated = 0;
        for item in next.iter_mut().filter(|i| i.matches(id, color, size)) {
            item.quantity = quantity;
            updated += 1;
        }

        if updated > 0 {
            self.commit(next, Some(CartAction::UpdateQuantity))?;
        }
        Ok(updated)
    }

    /// Empty the cart. Clearing an empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new(), None)?;
        self.notifier.notify(Toast::info("Cart cleared"));
        Ok(())
    }

    /// Write the current lines to the store without recording activity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cart cannot be persisted.
    pub fn flush(&self) -> Result<(), StoreError> {
        save_json(&*self.store, keys::CART, &self.items)
    }

    // =========================================================================
    // Derived values
    // =========================================================================

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a line matches `id` and, when given, `color`/`size`.
    #[must_use]
    pub fn contains(&self, id: &ProductId, color: Option<&str>, size: Option<&str>) -> bool {
        self.items.iter().any(|i| i.matches(id, color, size))
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |total, i| total.saturating_add(i.quantity))
    }

    /// Sum of `price × quantity` over all lines.
    ///
    /// An empty cart is zero in the store currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` if lines are priced in
    /// different currencies, or `PriceError::Overflow`.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        let mut lines = self.items.iter();
        let Some(first) = lines.next() else {
            return Ok(Price::zero(self.currency));
        };

        lines.try_fold(first.line_total()?, |total, item| {
            total.checked_add(item.line_total()?)
        })
    }

    /// Recorded cart activity, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    pub fn activities(&self) -> Result<Vec<CartActivity>, StoreError> {
        Ok(hydrate_json(&*self.store, keys::CART_ACTIVITIES)?.unwrap_or_default())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Write `next` and only then make it the current cart. For a signed-in
    /// user with a non-empty cart, also record the change.
    fn commit(
        &mut self,
        next: Vec<CartItem>,
        action: Option<CartAction>,
    ) -> Result<(), StoreError> {
        save_json(&*self.store, keys::CART, &next)?;
        self.items = next;

        let Some(action) = action else {
            return Ok(());
        };
        if self.items.is_empty() {
            return Ok(());
        }
        let Some(user) = self.identity.borrow().clone() else {
            return Ok(());
        };

        if let Err(error) = self.record_activity(user, action) {
            tracing::warn!(%error, "Failed to record cart activity");
        }
        Ok(())
    }

    fn record_activity(&self, user: User, action: CartAction) -> Result<(), StoreError> {
        let mut activities = self.activities()?;
        activities.insert(
            0,
            CartActivity {
                user_id: user.id,
                user_name: user.name,
                email: user.email,
                timestamp: Utc::now(),
                action,
                items: self.items.clone(),
            },
        );
        activities.truncate(MAX_ACTIVITIES);
        save_json(&*self.store, keys::CART_ACTIVITIES, &activities)
    }
}

enum Merged {
    Updated { name: String, quantity: u32 },
    Inserted { name: String },
}

fn merge(items: &mut Vec<CartItem>, mut item: CartItem, quantity: u32) -> Merged {
    if let Some(existing) = items.iter_mut().find(|i| i.same_line(&item)) {
        existing.quantity = existing.quantity.saturating_add(quantity);
        Merged::Updated {
            name: existing.name.clone(),
            quantity: existing.quantity,
        }
    } else {
        item.quantity = quantity;
        let name = item.name.clone();
        items.push(item);
        Merged::Inserted { name }
    }
}

/// Drop empty lines and merge duplicates, keeping first-seen order.
fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut normalized: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        let quantity = item.quantity;
        if quantity > 0 {
            merge(&mut normalized, item, quantity);
        }
    }
    normalized
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::testing::LockableStore;
    use crate::store::{KeyValueStore, MemoryStore, load_json};
    use tindahan_core::{Email, UserId};

    struct Fixture {
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        identity: watch::Sender<Option<User>>,
        cart: CartState,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let identity = watch::Sender::new(None);
        let cart = CartState::mount(
            store.clone(),
            notifier.clone(),
            identity.subscribe(),
            CurrencyCode::PHP,
        )
        .unwrap();
        Fixture {
            store,
            notifier,
            identity,
            cart,
        }
    }

    fn item(id: &str, price: &str, color: Option<&str>, size: Option<&str>) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::parse_display(price, CurrencyCode::PHP).unwrap(),
            image: format!("{id}.jpg"),
            quantity: 1,
            color: color.map(str::to_owned),
            color_name: None,
            size: size.map(str::to_owned),
        }
    }

    fn maria() -> User {
        User {
            id: UserId::new("u-1"),
            name: "Maria".to_owned(),
            email: Email::parse("maria@shop.ph").unwrap(),
            is_admin: false,
            admin_role: None,
        }
    }

    #[test]
    fn test_add_merges_same_line() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱1,499", None, Some("M")), None).unwrap();
        f.cart.add_item(item("1", "₱1,499", None, Some("M")), Some(2)).unwrap();
        f.cart.add_item(item("1", "₱1,499", None, Some("L")), None).unwrap();

        assert_eq!(f.cart.items().len(), 2);
        assert_eq!(f.cart.items()[0].quantity, 3);
        assert_eq!(
            f.notifier.messages(),
            vec![
                "Product 1 added to cart",
                "Updated Product 1 quantity to 3",
                "Product 1 added to cart",
            ]
        );
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", None, None), Some(0)).unwrap();
        assert!(f.cart.is_empty());
        assert!(f.store.get(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_remove_uses_wildcards_and_removes_first_match() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", Some("red"), Some("S")), None).unwrap();
        f.cart.add_item(item("1", "₱10", Some("blue"), Some("S")), None).unwrap();
        f.cart.add_item(item("2", "₱10", None, None), None).unwrap();

        let removed = f.cart.remove_item(&ProductId::new("1"), None, Some("S")).unwrap();
        assert_eq!(removed.unwrap().color.as_deref(), Some("red"));
        assert!(f.cart.contains(&ProductId::new("1"), Some("blue"), None));
        assert!(f.cart.contains(&ProductId::new("2"), None, None));
    }

    #[test]
    fn test_remove_missing_is_silent() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", None, None), None).unwrap();
        f.notifier.drain();

        assert!(f.cart.remove_item(&ProductId::new("9"), None, None).unwrap().is_none());
        assert!(f.notifier.messages().is_empty());
    }

    #[test]
    fn test_update_quantity_applies_to_all_matches() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", Some("red"), None), None).unwrap();
        f.cart.add_item(item("1", "₱10", Some("blue"), None), None).unwrap();

        assert_eq!(f.cart.update_quantity(&ProductId::new("1"), 4, None, None).unwrap(), 2);
        assert_eq!(f.cart.total_items(), 8);

        assert_eq!(f.cart.update_quantity(&ProductId::new("1"), 0, None, None).unwrap(), 0);
        assert_eq!(f.cart.total_items(), 8);
    }

    #[test]
    fn test_subtotal_and_total_items() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱1,499", None, None), Some(2)).unwrap();
        f.cart.add_item(item("2", "₱999", None, None), Some(1)).unwrap();

        let subtotal = f.cart.subtotal().unwrap();
        assert_eq!(subtotal.minor_units(), 399_700);
        assert_eq!(f.cart.total_items(), 3);
    }

    #[test]
    fn test_subtotal_rejects_mixed_currencies() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", None, None), None).unwrap();
        let mut usd = item("2", "$5", None, None);
        usd.price = Price::from_minor_units(500, CurrencyCode::USD);
        f.cart.add_item(usd, None).unwrap();

        assert!(matches!(
            f.cart.subtotal(),
            Err(PriceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_subtotal_uses_store_currency() {
        let f = fixture();
        let subtotal = f.cart.subtotal().unwrap();
        assert_eq!(subtotal, Price::zero(CurrencyCode::PHP));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut f = fixture();
        f.cart.clear_cart().unwrap();
        f.cart.clear_cart().unwrap();
        assert!(f.cart.is_empty());
        assert_eq!(f.store.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_activity_only_when_signed_in() {
        let mut f = fixture();
        f.cart.add_item(item("1", "₱10", None, None), None).unwrap();
        assert!(f.cart.activities().unwrap().is_empty());

        f.identity.send_replace(Some(maria()));
        f.cart.add_item(item("2", "₱10", None, None), None).unwrap();
        f.cart.clear_cart().unwrap();

        let activities = f.cart.activities().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].action, CartAction::Add);
        assert_eq!(activities[0].user_name, "Maria");
        assert_eq!(activities[0].items.len(), 2);
    }

    #[test]
    fn test_activity_log_capped_newest_first() {
        let mut f = fixture();
        f.identity.send_replace(Some(maria()));
        f.cart.add_item(item("1", "₱10", None, None), None).unwrap();
        for quantity in 1..=60 {
            f.cart
                .update_quantity(&ProductId::new("1"), quantity, None, None)
                .unwrap();
        }

        let activities = f.cart.activities().unwrap();
        assert_eq!(activities.len(), MAX_ACTIVITIES);
        assert_eq!(activities[0].items[0].quantity, 60);
        assert_eq!(activities[0].action, CartAction::UpdateQuantity);
    }

    #[test]
    fn test_add_items_writes_once() {
        let mut f = fixture();
        f.identity.send_replace(Some(maria()));
        let added = f
            .cart
            .add_items(vec![
                item("1", "₱10", None, None),
                item("2", "₱20", None, None),
                item("1", "₱10", None, None),
            ])
            .unwrap();

        assert_eq!(added, 3);
        assert_eq!(f.cart.items().len(), 2);
        assert_eq!(f.cart.total_items(), 3);
        assert_eq!(f.notifier.messages(), vec!["Added 3 items to cart"]);

        let activities = f.cart.activities().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].action, CartAction::AddAll);
    }

    #[test]
    fn test_hydrate_normalizes_lines() {
        let store = Arc::new(MemoryStore::new());
        let mut zero = item("3", "₱10", None, None);
        zero.quantity = 0;
        let stored = vec![
            item("1", "₱10", None, None),
            item("1", "₱10", None, None),
            zero,
        ];
        save_json(&*store, keys::CART, &stored).unwrap();

        let identity = watch::Sender::new(None);
        let cart = CartState::mount(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            identity.subscribe(),
            CurrencyCode::PHP,
        )
        .unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 2);

        let persisted: Vec<CartItem> = load_json(&*store, keys::CART).unwrap().unwrap();
        assert_eq!(persisted.len(), 3);
    }

    #[test]
    fn test_malformed_cart_hydrates_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::CART, "not json").unwrap();
        let identity = watch::Sender::new(None);
        let cart = CartState::mount(
            store,
            Arc::new(RecordingNotifier::new()),
            identity.subscribe(),
            CurrencyCode::PHP,
        )
        .unwrap();
        assert!(cart.is_empty());
    }

    fn mount_over(store: SharedStore, currency: CurrencyCode) -> CartState {
        let identity = watch::Sender::new(None);
        CartState::mount(
            store,
            Arc::new(RecordingNotifier::new()),
            identity.subscribe(),
            currency,
        )
        .unwrap()
    }

    #[test]
    fn test_legacy_prices_without_symbol_use_store_currency() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::CART,
                r#"[{"id":1,"name":"Cap","price":"19.99","image":"cap.jpg","quantity":2}]"#,
            )
            .unwrap();

        let mut cart = mount_over(store, CurrencyCode::USD);
        assert_eq!(cart.items()[0].price.currency(), CurrencyCode::USD);

        let mut tee = item("2", "1", None, None);
        tee.price = Price::from_minor_units(500, CurrencyCode::USD);
        cart.add_item(tee, None).unwrap();

        assert_eq!(
            cart.subtotal().unwrap(),
            Price::from_minor_units(4498, CurrencyCode::USD)
        );
    }

    #[test]
    fn test_unreadable_line_does_not_erase_the_rest() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::CART,
                r#"[
                    {"id":1,"name":"Cap","price":"₱1,499","image":"cap.jpg","quantity":2},
                    {"id":2,"name":"Sticker","price":"Free","image":"s.jpg","quantity":1}
                ]"#,
            )
            .unwrap();

        let mut cart = mount_over(store.clone(), CurrencyCode::PHP);
        assert_eq!(cart.items().len(), 1);

        cart.add_item(item("3", "₱599", None, None), None).unwrap();

        let persisted: Vec<CartItem> = load_json(&*store, keys::CART).unwrap().unwrap();
        let names: Vec<_> = persisted.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cap", "Product 3"]);
        assert_eq!(persisted[0].quantity, 2);
    }

    #[test]
    fn test_failed_write_leaves_cart_unchanged() {
        let store = Arc::new(LockableStore::default());
        let notifier = Arc::new(RecordingNotifier::new());
        let identity = watch::Sender::new(None);
        let mut cart = CartState::mount(
            store.clone(),
            notifier.clone(),
            identity.subscribe(),
            CurrencyCode::PHP,
        )
        .unwrap();
        cart.add_item(item("1", "₱100", None, None), Some(2)).unwrap();
        notifier.drain();

        store.lock_writes();
        assert!(cart.add_item(item("1", "₱100", None, None), None).is_err());
        assert!(cart.add_item(item("2", "₱100", None, None), None).is_err());
        assert!(cart.remove_item(&ProductId::new("1"), None, None).is_err());
        assert!(cart.update_quantity(&ProductId::new("1"), 9, None, None).is_err());
        assert!(cart.clear_cart().is_err());

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 2);
        assert!(notifier.messages().is_empty());
    }
}
