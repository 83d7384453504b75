//! Services around the cart and catalog.
//!
//! # Services
//!
//! - `postal` - Brazilian postal code (CEP) lookup client
//! - `location` - Delivery location chosen by the shopper, kept in local storage

pub mod location;
pub mod postal;

pub use location::{DELIVERY_LOCATION_KEY, DeliveryLocation, DeliveryLocationService, LocationError};
pub use postal::{Locality, PostalError, PostalLookupClient};
