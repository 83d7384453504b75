//! Nação Raiz storefront library.
//!
//! State layer of the storefront: the Shopify Storefront API client, the
//! persistent cart store with checkout hand-off, the catalog filter and sort
//! view-model, and the postal-code delivery location. Surfaces (the `raiz`
//! CLI, integration tests) build an [`state::AppState`] and drive it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod services;
pub mod shopify;
pub mod state;
pub mod storage;
