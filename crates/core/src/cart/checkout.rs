//! Checkout handoff payload.
//!
//! At checkout the cart lines are sent to the backend, which creates a
//! hosted payment session and answers with a redirect URL. Stock is not part
//! of the payload; the backend re-validates inventory itself.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::{Cart, CartItem};
use crate::types::ProductId;

/// Checkout was requested for a cart with no lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Your cart is empty!")]
pub struct EmptyCart;

/// One cart line as submitted to the checkout endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub image: String,
}

impl From<&CartItem> for CheckoutLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price.amount(),
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            image: item.image.clone(),
        }
    }
}

/// Body of the create-checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_items: Vec<CheckoutLine>,
}

impl Cart {
    /// Build the checkout payload for the current lines.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyCart`] if there is nothing to check out.
    pub fn checkout_request(&self) -> Result<CheckoutRequest, EmptyCart> {
        if self.is_empty() {
            return Err(EmptyCart);
        }
        Ok(CheckoutRequest {
            cart_items: self.items().iter().map(CheckoutLine::from).collect(),
        })
    }
}
