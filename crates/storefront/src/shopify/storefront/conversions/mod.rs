//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_checkout, convert_user_errors};
pub use collections::convert_collection;
pub use products::{convert_product, convert_product_connection};
