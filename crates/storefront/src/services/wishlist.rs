//! Wishlist state.
//!
//! Each user has their own wishlist under `wishlist-<userId>`. The container
//! follows the auth channel: before every operation it checks for an
//! identity change and, if there was one, swaps in the new user's list (or
//! an empty list when signed out). Lists are never merged across users.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::instrument;

use tindahan_core::{CurrencyCode, ProductId};

use crate::models::{User, WishlistItem, decode_priced_line};
use crate::notify::{SharedNotifier, Toast};
use crate::store::{SharedStore, StoreError, hydrate_lines, keys, save_json, validate_key};

/// Wishlist state container.
pub struct WishlistState {
    store: SharedStore,
    notifier: SharedNotifier,
    identity: watch::Receiver<Option<User>>,
    currency: CurrencyCode,
    /// Key of the list currently loaded, `None` when signed out.
    key: Option<String>,
    items: Vec<WishlistItem>,
}

impl std::fmt::Debug for WishlistState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistState")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl WishlistState {
    /// Load the wishlist of whoever is signed in.
    ///
    /// Unreadable entries are dropped individually. Legacy price strings
    /// without a currency symbol are read in `currency`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    #[instrument(skip_all)]
    pub fn mount(
        store: SharedStore,
        notifier: SharedNotifier,
        mut identity: watch::Receiver<Option<User>>,
        currency: CurrencyCode,
    ) -> Result<Self, StoreError> {
        let user = identity.borrow_and_update().clone();
        let mut wishlist = Self {
            store,
            notifier,
            identity,
            currency,
            key: None,
            items: Vec::new(),
        };
        wishlist.load_for(user.as_ref())?;
        Ok(wishlist)
    }

    /// Add an item unless one with the same id is already saved.
    ///
    /// Does nothing when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the wishlist cannot be read or persisted.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_item(&mut self, item: WishlistItem) -> Result<bool, StoreError> {
        self.sync_user()?;
        if self.key.is_none() || self.contains(&item.id) {
            return Ok(false);
        }

        let name = item.name.clone();
        let mut next = self.items.clone();
        next.push(item);
        self.commit(next)?;
        self.notifier
            .notify(Toast::success(format!("{name} added to wishlist")));
        Ok(true)
    }

    /// Remove the item with `id`, returning it if it was saved.
    ///
    /// Does nothing when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the wishlist cannot be read or persisted.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: &ProductId) -> Result<Option<WishlistItem>, StoreError> {
        self.sync_user()?;
        if self.key.is_none() {
            return Ok(None);
        }
        let Some(position) = self.items.iter().position(|i| i.id == *id) else {
            return Ok(None);
        };

        let mut next = self.items.clone();
        let removed = next.remove(position);
        self.commit(next)?;
        self.notifier.notify(Toast::success(format!(
            "{} removed from wishlist",
            removed.name
        )));
        Ok(Some(removed))
    }

    /// Empty the wishlist. Does nothing when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the wishlist cannot be read or persisted.
    #[instrument(skip(self))]
    pub fn clear_wishlist(&mut self) -> Result<(), StoreError> {
        self.sync_user()?;
        if self.key.is_none() {
            return Ok(());
        }

        self.commit(Vec::new())?;
        self.notifier.notify(Toast::info("Wishlist cleared"));
        Ok(())
    }

    /// Remove the item if saved, otherwise add it. Returns whether the item
    /// is saved afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the wishlist cannot be read or persisted.
    pub fn toggle(&mut self, item: WishlistItem) -> Result<bool, StoreError> {
        self.sync_user()?;
        if self.contains(&item.id) {
            self.remove_item(&item.id)?;
            Ok(false)
        } else {
            self.add_item(item)
        }
    }

    /// Whether an item with `id` is saved for the current user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an identity change requires a reload that fails.
    pub fn is_in_wishlist(&mut self, id: &ProductId) -> Result<bool, StoreError> {
        self.sync_user()?;
        Ok(self.contains(id))
    }

    /// Saved items of the current user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an identity change requires a reload that fails.
    pub fn items(&mut self) -> Result<&[WishlistItem], StoreError> {
        self.sync_user()?;
        Ok(&self.items)
    }

    /// Write the current list to the store. Does nothing when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the wishlist cannot be persisted.
    pub fn flush(&self) -> Result<(), StoreError> {
        match &self.key {
            Some(key) => save_json(&*self.store, key, &self.items),
            None => Ok(()),
        }
    }

    fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|i| i.id == *id)
    }

    /// Reload if the signed-in user changed since the last operation.
    fn sync_user(&mut self) -> Result<(), StoreError> {
        // A closed channel means auth is gone; keep the last known list.
        if !self.identity.has_changed().unwrap_or(false) {
            return Ok(());
        }
        let user = self.identity.borrow_and_update().clone();
        self.load_for(user.as_ref())
    }

    /// Load `user`'s list. A user id that cannot form a valid store key is
    /// treated as signed out.
    fn load_for(&mut self, user: Option<&User>) -> Result<(), StoreError> {
        let key = user
            .map(|u| keys::wishlist(&u.id))
            .filter(|key| match validate_key(key) {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(%error, "Wishlist unavailable for this user id");
                    false
                }
            });
        let currency = self.currency;
        self.items = match &key {
            Some(key) => {
                hydrate_lines(&*self.store, key, |line| decode_priced_line(line, currency))?
            }
            None => Vec::new(),
        };
        let mut seen = HashSet::new();
        self.items.retain(|i| seen.insert(i.id.clone()));
        tracing::debug!(key = ?key, items = self.items.len(), "Wishlist loaded");
        self.key = key;
        Ok(())
    }

    /// Write `next` under the current key and only then make it current.
    fn commit(&mut self, next: Vec<WishlistItem>) -> Result<(), StoreError> {
        if let Some(key) = &self.key {
            save_json(&*self.store, key, &next)?;
        }
        self.items = next;
        Ok(())
    }
}
