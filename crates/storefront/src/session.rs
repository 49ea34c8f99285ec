//! Session lifetime.
//!
//! A [`StorefrontSession`] composes the containers over one store. Mounting
//! hydrates auth first, then the cart and the wishlist, which both subscribe
//! to auth's identity channel. Closing flushes the lists back to the store.

use tracing::instrument;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::models::{CartItem, WishlistItem};
use crate::notify::{SharedNotifier, Toast};
use crate::services::{AuthState, CartState, WishlistState};
use crate::store::SharedStore;

/// One mount/close cycle of the storefront containers.
pub struct StorefrontSession {
    auth: AuthState,
    cart: CartState,
    wishlist: WishlistState,
    catalog: Catalog,
    notifier: SharedNotifier,
}

impl std::fmt::Debug for StorefrontSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontSession")
            .field("auth", &self.auth)
            .field("cart", &self.cart)
            .field("wishlist", &self.wishlist)
            .field("catalog_products", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl StorefrontSession {
    /// Hydrate every container from `store`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Store` if the store cannot be read.
    #[instrument(skip_all)]
    pub fn mount(
        store: SharedStore,
        notifier: SharedNotifier,
        catalog: Catalog,
        config: &StorefrontConfig,
    ) -> Result<Self> {
        let auth = AuthState::mount(
            store.clone(),
            notifier.clone(),
            config.admin_registration_code.clone(),
        )?;
        let cart = CartState::mount(
            store.clone(),
            notifier.clone(),
            auth.subscribe(),
            config.currency,
        )?;
        let wishlist = WishlistState::mount(
            store,
            notifier.clone(),
            auth.subscribe(),
            config.currency,
        )?;

        tracing::debug!(
            signed_in = auth.is_signed_in(),
            cart_lines = cart.items().len(),
            "Session mounted"
        );

        Ok(Self {
            auth,
            cart,
            wishlist,
            catalog,
            notifier,
        })
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub const fn auth_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartState {
        &mut self.cart
    }

    pub const fn wishlist_mut(&mut self) -> &mut WishlistState {
        &mut self.wishlist
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Add every wishlist item to the cart in one batch.
    ///
    /// The wishlist is left as is. Returns the number of items added.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Store` if either list cannot be read or
    /// persisted.
    #[instrument(skip(self))]
    pub fn add_wishlist_to_cart(&mut self) -> Result<usize> {
        if !self.auth.is_signed_in() {
            self.notifier
                .notify(Toast::info("Sign in to use your wishlist"));
            return Ok(0);
        }

        let items: Vec<CartItem> = self
            .wishlist
            .items()?
            .iter()
            .map(WishlistItem::to_cart_item)
            .collect();
        if items.is_empty() {
            self.notifier.notify(Toast::info("Your wishlist is empty"));
            return Ok(0);
        }

        Ok(self.cart.add_items(items)?)
    }

    /// Flush the lists and end the session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Store` if a list cannot be persisted.
    #[instrument(skip_all)]
    pub fn close(mut self) -> Result<()> {
        self.cart.flush()?;
        // Pick up a sign-out that happened after the last wishlist call.
        self.wishlist.items()?;
        self.wishlist.flush()?;
        tracing::debug!("Session closed");
        Ok(())
    }
}
