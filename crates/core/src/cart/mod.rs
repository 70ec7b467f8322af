//! The shopping cart store.
//!
//! [`Cart`] is a plain, synchronous state container: an ordered list of
//! [`CartItem`] lines with four mutators and two derived totals. It has no
//! notion of where it is stored; callers load it with
//! [`Cart::rehydrate`], mutate it, and write [`Cart::snapshot`] back under
//! [`CART_STORAGE_KEY`] after every mutation.
//!
//! # Invariants
//!
//! After every mutation completes:
//! - no two lines share a [`LineKey`] (`product_id`, `size`, `color`)
//! - every line satisfies `1 <= quantity <= stock`
//!
//! # Example
//!
//! ```
//! use zaheen_core::{Cart, LineKey, NewCartItem, Price, ProductId};
//!
//! let sweater = NewCartItem {
//!     product_id: ProductId::new("p-1"),
//!     name: "Cable Knit Sweater".to_string(),
//!     price: Price::from_cents(4_999),
//!     size: "M".to_string(),
//!     color: "Navy".to_string(),
//!     image: "https://cdn.example.com/sweater.jpg".to_string(),
//!     stock: 3,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(sweater.clone(), 2).unwrap();
//! assert!(cart.add_item(sweater, 2).is_err()); // 4 > 3 in stock
//! assert_eq!(cart.total_items(), 2);
//!
//! cart.update_quantity(&LineKey::new("p-1", "M", "Navy"), 0);
//! assert_eq!(cart.total_items(), 1);
//! ```

mod checkout;
mod line;
mod persist;

pub use checkout::{CheckoutLine, CheckoutRequest, EmptyCart};
pub use line::{CartItem, LineKey, NewCartItem};
pub use persist::{CART_STORAGE_KEY, CartLoadError, PersistedCart};

use thiserror::Error;

use crate::types::{Price, ProductId};

/// An add was rejected because the resulting line would exceed its stock.
///
/// The cart is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Only {available} items in stock!")]
pub struct StockExceeded {
    /// Product the add was for.
    pub product_id: ProductId,
    /// Stock snapshot the request was checked against.
    pub available: u32,
    /// Quantity the line would have ended up with.
    pub requested: u64,
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up a line by its composite key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Add `quantity` units of `item`, merging into an existing line with the
    /// same key.
    ///
    /// A `quantity` of zero is treated as one. When merging, the line's stock
    /// snapshot is refreshed to `item.stock`, the value the check was made
    /// against; its price snapshot is kept. Returns a copy of the resulting
    /// line.
    ///
    /// # Errors
    ///
    /// Returns [`StockExceeded`] if the resulting quantity would be greater
    /// than `item.stock`. The cart is unchanged in that case.
    pub fn add_item(&mut self, item: NewCartItem, quantity: u32) -> Result<CartItem, StockExceeded> {
        let quantity = quantity.max(1);
        let key = item.key();

        if let Some(line) = self.items.iter_mut().find(|line| line.matches(&key)) {
            let merged = u64::from(line.quantity) + u64::from(quantity);
            let new_quantity = u32::try_from(merged)
                .ok()
                .filter(|&q| q <= item.stock)
                .ok_or_else(|| StockExceeded {
                    product_id: key.product_id.clone(),
                    available: item.stock,
                    requested: merged,
                })?;
            line.quantity = new_quantity;
            line.stock = item.stock;
            return Ok(line.clone());
        }

        if quantity > item.stock {
            return Err(StockExceeded {
                product_id: key.product_id,
                available: item.stock,
                requested: u64::from(quantity),
            });
        }
        let line = item.into_line(quantity);
        self.items.push(line.clone());
        Ok(line)
    }

    /// Remove the line identified by `key`.
    ///
    /// Returns the removed line, or `None` if there was none. Removing an
    /// absent key is not an error.
    pub fn remove_item(&mut self, key: &LineKey) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.matches(key))?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of the line identified by `key`, clamped to
    /// `1..=stock`.
    ///
    /// Out-of-range requests are clamped, never rejected, and the line is
    /// never removed. Returns the quantity actually stored, or `None` if no
    /// such line exists.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: i64) -> Option<u32> {
        let line = self.items.iter_mut().find(|item| item.matches(key))?;
        let upper = i64::from(line.stock.max(1));
        let clamped = quantity.clamp(1, upper);
        line.quantity = u32::try_from(clamped).unwrap_or(1);
        Some(line.quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price × quantity` across all lines, using snapshot prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn item(product: &str, size: &str, color: &str, cents: i64, stock: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(product),
            name: format!("Knit {product}"),
            price: Price::from_cents(cents),
            size: size.to_string(),
            color: color.to_string(),
            image: format!("https://cdn.example.com/{product}.jpg"),
            stock,
        }
    }

    #[test]
    fn test_add_new_line_and_merge_same_key() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "M", "Black", 1000, 5), 2).unwrap();
        let line = cart.add_item(item("p1", "M", "Black", 1000, 5), 3).unwrap();

        assert_eq!(line.quantity, 5);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_returned_line_matches_stored_line() {
        let mut cart = Cart::new();
        let added = cart.add_item(item("p1", "M", "Black", 1000, 5), 2).unwrap();
        assert_eq!(cart.items().last(), Some(&added));

        cart.add_item(item("p2", "M", "Black", 1000, 5), 1).unwrap();
        let merged = cart.add_item(item("p1", "M", "Black", 1000, 5), 1).unwrap();
        assert_eq!(merged.quantity, 3);
        assert_eq!(cart.get(&LineKey::new("p1", "M", "Black")), Some(&merged));
        assert_eq!(cart.items().first(), Some(&merged));
    }

    #[test]
    fn test_different_variant_is_a_different_line() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "M", "Black", 1000, 5), 1).unwrap();
        cart.add_item(item("p1", "L", "Black", 1000, 5), 1).unwrap();
        cart.add_item(item("p1", "M", "Navy", 1000, 5), 1).unwrap();

        assert_eq!(cart.len(), 3);
        let sizes: Vec<_> = cart.items().iter().map(|i| i.size.as_str()).collect();
        assert_eq!(sizes, ["M", "L", "M"]);
    }

    #[test]
    fn test_add_zero_quantity_defaults_to_one() {
        let mut cart = Cart::new();
        let line = cart.add_item(item("p1", "S", "Red", 1000, 5), 0).unwrap();
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_add_rejects_new_line_over_stock() {
        let mut cart = Cart::new();
        let err = cart.add_item(item("p1", "S", "Red", 1000, 2), 3).unwrap_err();

        assert_eq!(err.available, 2);
        assert_eq!(err.requested, 3);
        assert_eq!(err.to_string(), "Only 2 items in stock!");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_merge_over_stock_and_leaves_state() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 4), 3).unwrap();
        let before = cart.clone();

        let err = cart.add_item(item("p1", "S", "Red", 1000, 4), 2).unwrap_err();
        assert_eq!(err.requested, 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_rejects_out_of_stock_product() {
        let mut cart = Cart::new();
        assert!(cart.add_item(item("p1", "S", "Red", 1000, 0), 1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_refreshes_stock_but_keeps_price() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 2), 2).unwrap();

        let restocked = item("p1", "S", "Red", 1500, 10);
        let line = cart.add_item(restocked, 3).unwrap();

        assert_eq!(line.quantity, 5);
        assert_eq!(line.stock, 10);
        assert_eq!(line.price, Price::from_cents(1000));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 5), 1).unwrap();
        cart.add_item(item("p2", "S", "Red", 1000, 5), 1).unwrap();
        let key = LineKey::new("p1", "S", "Red");

        assert!(cart.remove_item(&key).is_some());
        let once = cart.clone();
        assert!(cart.remove_item(&key).is_none());
        assert_eq!(cart, once);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 7), 3).unwrap();
        let key = LineKey::new("p1", "S", "Red");

        assert_eq!(cart.update_quantity(&key, 0), Some(1));
        assert_eq!(cart.update_quantity(&key, -4), Some(1));
        assert_eq!(cart.update_quantity(&key, 7 + 100), Some(7));
        assert_eq!(cart.update_quantity(&key, 4), Some(4));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 7), 3).unwrap();
        let before = cart.clone();

        assert_eq!(cart.update_quantity(&LineKey::new("p1", "M", "Red"), 2), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 10), 2).unwrap();
        cart.add_item(item("p2", "M", "Gray", 500, 10), 3).unwrap();

        assert_eq!(cart.total_price(), Price::from_cents(3500));
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(item("p1", "S", "Red", 1000, 10), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { product: u8, size: u8, color: u8, stock: u32, quantity: u32 },
        Remove { product: u8, size: u8, color: u8 },
        Update { product: u8, size: u8, color: u8, quantity: i64 },
        Clear,
    }

    const SIZES: [&str; 3] = ["S", "M", "L"];
    const COLORS: [&str; 2] = ["Black", "Navy"];

    fn key_of(product: u8, size: u8, color: u8) -> LineKey {
        LineKey::new(
            format!("p{product}"),
            SIZES[usize::from(size)],
            COLORS[usize::from(color)],
        )
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..3, 0u8..3, 0u8..2, 0u32..8, 0u32..6).prop_map(
                |(product, size, color, stock, quantity)| Op::Add { product, size, color, stock, quantity }
            ),
            1 => (0u8..3, 0u8..3, 0u8..2).prop_map(|(product, size, color)| Op::Remove { product, size, color }),
            2 => (0u8..3, 0u8..3, 0u8..2, -5i64..20).prop_map(
                |(product, size, color, quantity)| Op::Update { product, size, color, quantity }
            ),
            1 => Just(Op::Clear),
        ]
    }

    fn apply(cart: &mut Cart, op: &Op) {
        match *op {
            Op::Add { product, size, color, stock, quantity } => {
                let key = key_of(product, size, color);
                let new_item = NewCartItem {
                    product_id: key.product_id,
                    name: "Knit".to_string(),
                    price: Price::from_cents(1999),
                    size: key.size,
                    color: key.color,
                    image: String::new(),
                    stock,
                };
                let before = cart.clone();
                if cart.add_item(new_item, quantity).is_err() {
                    assert_eq!(*cart, before, "rejected add must not change the cart");
                }
            }
            Op::Remove { product, size, color } => {
                cart.remove_item(&key_of(product, size, color));
            }
            Op::Update { product, size, color, quantity } => {
                cart.update_quantity(&key_of(product, size, color), quantity);
            }
            Op::Clear => cart.clear(),
        }
    }

    fn assert_invariants(cart: &Cart) {
        for (i, a) in cart.items().iter().enumerate() {
            assert!(a.quantity_in_bounds(), "quantity out of bounds: {a:?}");
            for b in &cart.items()[i + 1..] {
                assert_ne!(a.key(), b.key(), "duplicate line key");
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn invariants_hold_for_any_operation_sequence(ops in prop::collection::vec(op_strategy(), 0..40)) {
            let mut cart = Cart::new();
            for op in &ops {
                apply(&mut cart, op);
                assert_invariants(&cart);
            }
        }

        #[test]
        fn remove_twice_equals_remove_once(
            ops in prop::collection::vec(op_strategy(), 0..20),
            product in 0u8..3, size in 0u8..3, color in 0u8..2,
        ) {
            let mut cart = Cart::new();
            for op in &ops {
                apply(&mut cart, op);
            }
            let key = key_of(product, size, color);
            cart.remove_item(&key);
            let once = cart.clone();
            cart.remove_item(&key);
            prop_assert_eq!(cart, once);
        }

        #[test]
        fn snapshot_round_trips(ops in prop::collection::vec(op_strategy(), 0..20)) {
            let mut cart = Cart::new();
            for op in &ops {
                apply(&mut cart, op);
            }
            let value = serde_json::to_value(cart.snapshot()).unwrap();
            let restored = Cart::rehydrate(value).unwrap();
            prop_assert_eq!(restored, cart);
        }
    }
}
