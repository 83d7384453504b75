//! Raiz Core - Shared types library.
//!
//! This crate provides common types used across all Raiz components:
//! - `storefront` - Catalog client, cart store and catalog view-model
//! - `cli` - Command-line surface for browsing, cart and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, postal codes and the cart aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
