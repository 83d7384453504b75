//! Cache types for Storefront API responses.

use crate::shopify::types::{Collection, Product, ProductConnection};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products { first: i64 },
    Collection { handle: String, first: i64 },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductConnection),
    Collection(Box<Collection>),
}
