//! Cache types for catalog responses.

use std::time::Duration;

use moka::future::Cache;
use zaheen_core::ProductId;

use super::types::{Category, Product};

/// Catalog reads are served from memory for this long.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
}

pub fn build() -> Cache<CacheKey, CacheValue> {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(CATALOG_TTL)
        .build()
}
