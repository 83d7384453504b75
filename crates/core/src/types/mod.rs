//! Core types for the Raiz storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod postal_code;
pub mod price;

pub use cart::{Cart, CartLine, LineOption};
pub use id::*;
pub use postal_code::{PostalCode, PostalCodeError};
pub use price::{CurrencyCode, INTEREST_FREE_INSTALLMENTS, Price, UnsupportedCurrency};
