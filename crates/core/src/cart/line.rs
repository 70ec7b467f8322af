//! Cart line items and their composite identity.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Identity of a cart line: product plus the selected size and color.
///
/// No two lines in a [`Cart`](super::Cart) share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.into(),
            color: color.into(),
        }
    }
}

/// One line in the cart.
///
/// `name`, `price`, `image` and `stock` are snapshots taken when the product
/// was added; they are never re-fetched while the line lives in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub image: String,
    pub stock: u32,
}

impl CartItem {
    /// Whether this line is identified by `key`.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    /// The composite key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// `price × quantity` using the snapshot price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether the line satisfies `1 <= quantity <= stock`.
    #[must_use]
    pub const fn quantity_in_bounds(&self) -> bool {
        self.quantity >= 1 && self.quantity <= self.stock
    }
}

/// A product/variant selection about to be added to the cart.
///
/// Same shape as [`CartItem`] minus the quantity, which is supplied
/// separately to [`Cart::add_item`](super::Cart::add_item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub size: String,
    pub color: String,
    pub image: String,
    pub stock: u32,
}

impl NewCartItem {
    /// The composite key this item will occupy.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    pub(crate) fn into_line(self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product_id,
            name: self.name,
            price: self.price,
            quantity,
            size: self.size,
            color: self.color,
            image: self.image,
            stock: self.stock,
        }
    }
}
