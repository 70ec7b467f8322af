//! Persisted cart snapshot and rehydration.
//!
//! The stored value is a single JSON object `{"items": [...]}` kept under
//! [`CART_STORAGE_KEY`]. There is no version field. A value that fails to
//! decode, or decodes into a cart that breaks the identity or quantity
//! invariant, is rejected as a whole; callers discard it and start empty.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cart, CartItem, LineKey};

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "zaheen-cart";

/// Serialized form of a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCart {
    pub items: Vec<CartItem>,
}

/// Why a stored snapshot could not be restored.
#[derive(Debug, Error)]
pub enum CartLoadError {
    #[error("stored cart does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored cart has two lines for {0:?}")]
    DuplicateLine(LineKey),

    #[error("stored cart line {key:?} has quantity {quantity} outside 1..={stock}")]
    QuantityOutOfBounds {
        key: LineKey,
        quantity: u32,
        stock: u32,
    },
}

impl Cart {
    /// Snapshot of the current lines, ready to be written to storage.
    #[must_use]
    pub fn snapshot(&self) -> PersistedCart {
        PersistedCart {
            items: self.items.clone(),
        }
    }

    /// Restore a cart from a stored JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`CartLoadError`] if the value does not decode into a
    /// [`PersistedCart`], or if the decoded lines repeat a key or violate
    /// `1 <= quantity <= stock`.
    pub fn rehydrate(value: serde_json::Value) -> Result<Self, CartLoadError> {
        let persisted: PersistedCart = serde_json::from_value(value)?;
        Self::try_from(persisted)
    }
}

impl TryFrom<PersistedCart> for Cart {
    type Error = CartLoadError;

    fn try_from(persisted: PersistedCart) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(persisted.items.len());
        for item in &persisted.items {
            let key = item.key();
            if !item.quantity_in_bounds() {
                return Err(CartLoadError::QuantityOutOfBounds {
                    key,
                    quantity: item.quantity,
                    stock: item.stock,
                });
            }
            if !seen.insert(key.clone()) {
                return Err(CartLoadError::DuplicateLine(key));
            }
        }

        Ok(Self {
            items: persisted.items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Price;

    fn line(product: &str, quantity: u32, stock: u32) -> serde_json::Value {
        json!({
            "productId": product,
            "name": "Ribbed Beanie",
            "price": 10,
            "quantity": quantity,
            "size": "M",
            "color": "Gray",
            "image": "https://cdn.example.com/beanie.jpg",
            "stock": stock,
        })
    }

    #[test]
    fn test_rehydrate_valid_snapshot() {
        let cart = Cart::rehydrate(json!({ "items": [line("p1", 2, 5), line("p2", 3, 3)] })).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Price::from_cents(5000));
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let cart = Cart::rehydrate(json!({ "items": [line("p1", 1, 5)] })).unwrap();
        let value = serde_json::to_value(cart.snapshot()).unwrap();

        assert_eq!(value["items"][0]["productId"], "p1");
        assert!(value.get("version").is_none());
    }

    #[test]
    fn test_rehydrate_rejects_wrong_shape() {
        let err = Cart::rehydrate(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CartLoadError::Malformed(_)));

        let err = Cart::rehydrate(json!({ "state": { "items": [] }, "version": 0 })).unwrap_err();
        assert!(matches!(err, CartLoadError::Malformed(_)));
    }

    #[test]
    fn test_rehydrate_rejects_duplicate_lines() {
        let err = Cart::rehydrate(json!({ "items": [line("p1", 1, 5), line("p1", 2, 5)] })).unwrap_err();
        assert!(matches!(err, CartLoadError::DuplicateLine(key) if key.product_id.as_str() == "p1"));
    }

    #[test]
    fn test_rehydrate_rejects_quantity_out_of_bounds() {
        let err = Cart::rehydrate(json!({ "items": [line("p1", 0, 5)] })).unwrap_err();
        assert!(matches!(err, CartLoadError::QuantityOutOfBounds { quantity: 0, .. }));

        let err = Cart::rehydrate(json!({ "items": [line("p1", 6, 5)] })).unwrap_err();
        assert!(matches!(err, CartLoadError::QuantityOutOfBounds { stock: 5, .. }));
    }
}
