//! Zaheen Core - Shared types and the cart store.
//!
//! This crate provides the types used across the Zaheen Knitwears components:
//! - `storefront` - Public storefront and admin dashboard
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no database access, no HTTP clients. Persistence of the cart is the
//! caller's job; this crate only defines the snapshot format and the
//! rehydration policy.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and roles
//! - [`cart`] - Line items, the cart reducer, persistence and checkout payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{
    CART_STORAGE_KEY, Cart, CartItem, CartLoadError, CheckoutLine, CheckoutRequest, EmptyCart, LineKey,
    NewCartItem, PersistedCart, StockExceeded,
};
pub use types::*;
