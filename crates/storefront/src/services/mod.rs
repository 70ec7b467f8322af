//! Business logic services for storefront.
//!
//! - `cart` - Session-backed cart store
//! - `media` - Product image uploads

pub mod cart;
pub mod media;

pub use cart::CartStore;
pub use media::{MediaError, MediaUploader, Upload};
