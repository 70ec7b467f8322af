//! Session-backed cart store.
//!
//! The cart lives in the visitor's session under the `zaheen-cart` key and
//! survives logout. Each request loads it once through the [`CartStore`]
//! extractor, applies synchronous [`Cart`] operations, and writes the
//! snapshot back after every mutation. Concurrent requests for the same
//! session are last-writer-wins.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::{debug, warn};
use zaheen_core::{Cart, CartItem, LineKey, NewCartItem, Price};

use crate::error::AppError;
use crate::models::session_keys;

/// The visitor's cart, bound to their session.
pub struct CartStore {
    session: Session,
    cart: Cart,
}

impl CartStore {
    /// Load the cart stored in `session`.
    ///
    /// A missing value yields an empty cart. A stored value that is malformed
    /// or breaks the cart invariants is logged, removed from the session and
    /// replaced with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, tower_sessions::session::Error> {
        let stored = session.get::<serde_json::Value>(session_keys::CART).await?;

        let cart = match stored {
            None => Cart::new(),
            Some(value) => match Cart::rehydrate(value) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable stored cart");
                    session.remove_value(session_keys::CART).await?;
                    Cart::new()
                }
            },
        };

        Ok(Self { session, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    /// Add `quantity` of `item`, merging into an existing line for the same
    /// product, size and color.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Stock`] if the resulting quantity would exceed the
    /// stock snapshot (the stored cart is left untouched), or a session error
    /// if the cart cannot be saved.
    pub async fn add_item(&mut self, item: NewCartItem, quantity: u32) -> Result<CartItem, AppError> {
        let line = self.cart.add_item(item, quantity)?;
        self.persist().await?;
        debug!(product_id = %line.product_id, quantity = line.quantity, "Cart line added");
        Ok(line)
    }

    /// Remove the line identified by `key`. Removing a missing line is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn remove_item(&mut self, key: &LineKey) -> Result<Option<CartItem>, AppError> {
        let removed = self.cart.remove_item(key);
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Set the quantity of the line identified by `key`, clamped to
    /// `1..=stock`. Returns the quantity actually stored, or `None` if no
    /// such line exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn update_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<Option<u32>, AppError> {
        let stored = self.cart.update_quantity(key, quantity);
        if stored.is_some() {
            self.persist().await?;
        }
        Ok(stored)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn clear(&mut self) -> Result<(), AppError> {
        self.cart.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.session
            .insert(session_keys::CART, self.cart.snapshot())
            .await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for CartStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        Ok(Self::load(session).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::MemoryStore;
    use zaheen_core::ProductId;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn beanie(stock: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new("p1"),
            name: "Ribbed Beanie".to_string(),
            price: Price::from_cents(1000),
            size: "M".to_string(),
            color: "Gray".to_string(),
            image: "https://cdn.example.com/beanie.jpg".to_string(),
            stock,
        }
    }

    fn key() -> LineKey {
        LineKey::new("p1", "M", "Gray")
    }

    #[tokio::test]
    async fn test_empty_session_loads_empty_cart() {
        let store = CartStore::load(session()).await.unwrap();
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_are_persisted_to_session() {
        let session = session();
        let mut store = CartStore::load(session.clone()).await.unwrap();
        store.add_item(beanie(5), 2).await.unwrap();
        store.update_quantity(&key(), 4).await.unwrap();

        let reloaded = CartStore::load(session).await.unwrap();
        assert_eq!(reloaded.total_items(), 4);
        assert_eq!(reloaded.cart(), store.cart());
    }

    #[tokio::test]
    async fn test_stock_rejection_leaves_stored_cart_unchanged() {
        let session = session();
        let mut store = CartStore::load(session.clone()).await.unwrap();
        store.add_item(beanie(3), 2).await.unwrap();

        let err = store.add_item(beanie(3), 2).await.unwrap_err();
        assert!(matches!(err, AppError::Stock(ref e) if e.available == 3));

        let reloaded = CartStore::load(session).await.unwrap();
        assert_eq!(reloaded.total_items(), 2);
    }

    #[tokio::test]
    async fn test_malformed_stored_cart_is_discarded() {
        let session = session();
        session
            .insert(session_keys::CART, json!({ "items": "not a list" }))
            .await
            .unwrap();

        let store = CartStore::load(session.clone()).await.unwrap();
        assert!(store.cart().is_empty());
        assert!(
            session
                .get::<serde_json::Value>(session_keys::CART)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_clear_and_remove() {
        let session = session();
        let mut store = CartStore::load(session.clone()).await.unwrap();
        store.add_item(beanie(5), 1).await.unwrap();

        assert!(store.remove_item(&key()).await.unwrap().is_some());
        assert!(store.remove_item(&key()).await.unwrap().is_none());

        store.add_item(beanie(5), 1).await.unwrap();
        store.clear().await.unwrap();
        let reloaded = CartStore::load(session).await.unwrap();
        assert!(reloaded.cart().is_empty());
    }
}
