//! Delivery location chosen by the shopper.
//!
//! The location is informational (shown next to the cart); no shipping cost
//! is computed from it. It is kept in local storage under
//! [`DELIVERY_LOCATION_KEY`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use raiz_core::{PostalCode, PostalCodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use super::postal::{Locality, PostalError, PostalLookupClient};
use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, load_json, save_json};

/// Storage key of the saved delivery location.
pub const DELIVERY_LOCATION_KEY: &str = "delivery-location";

/// Errors from locating a delivery address.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The input is not a valid CEP.
    #[error("Invalid postal code: {0}")]
    InvalidPostalCode(#[from] PostalCodeError),

    /// The lookup service failed or did not know the CEP.
    #[error("Postal lookup failed: {0}")]
    Lookup(#[from] PostalError),
}

/// A saved delivery location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLocation {
    /// Address data for the chosen CEP.
    pub locality: Locality,
    /// When the shopper chose it.
    pub saved_at: DateTime<Utc>,
}

/// Looks up and remembers the shopper's delivery location.
#[derive(Clone)]
pub struct DeliveryLocationService {
    client: PostalLookupClient,
    storage: Arc<dyn KeyValueStore>,
}

impl DeliveryLocationService {
    /// Create a new service.
    #[must_use]
    pub fn new(client: PostalLookupClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { client, storage }
    }

    /// Parse `raw`, look it up and save the result.
    ///
    /// A failure to save is logged; the looked-up location is still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a CEP or the lookup fails.
    #[instrument(skip(self))]
    pub async fn locate(&self, raw: &str) -> Result<DeliveryLocation, LocationError> {
        let postal_code = PostalCode::parse(raw)?;
        let locality = self.client.lookup(&postal_code).await?;

        let location = DeliveryLocation {
            locality,
            saved_at: Utc::now(),
        };

        if let Err(e) = save_json(self.storage.as_ref(), DELIVERY_LOCATION_KEY, &location) {
            tracing::warn!(error = %e, "Failed to save delivery location");
        }
        let formatted = postal_code.to_string();
        add_breadcrumb(
            "location",
            "Set delivery location",
            Some(&[("postal_code", formatted.as_str())]),
        );

        Ok(location)
    }

    /// The saved location, if any. An unreadable entry is logged and ignored.
    #[must_use]
    pub fn saved(&self) -> Option<DeliveryLocation> {
        match load_json(self.storage.as_ref(), DELIVERY_LOCATION_KEY) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable delivery location");
                None
            }
        }
    }

    /// Forget the saved location.
    pub fn forget(&self) {
        if let Err(e) = self.storage.remove(DELIVERY_LOCATION_KEY) {
            tracing::warn!(error = %e, "Failed to remove delivery location");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{ShopifyStorefrontConfig, StorefrontConfig};
    use crate::storage::MemoryStore;

    fn service(storage: Arc<MemoryStore>) -> DeliveryLocationService {
        let config = StorefrontConfig::new(
            ShopifyStorefrontConfig {
                store: "nacao-raiz.myshopify.com".to_string(),
                api_version: "2025-07".to_string(),
                storefront_token: SecretString::from("8f2c1d9e7a6b5c4d3e2f1a0b9c8d7e6f"),
                endpoint: None,
            },
            "/tmp/unused",
        );
        DeliveryLocationService::new(PostalLookupClient::new(&config).unwrap(), storage)
    }

    fn location() -> DeliveryLocation {
        DeliveryLocation {
            locality: Locality {
                postal_code: PostalCode::parse("01001000").unwrap(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
                district: Some("Sé".to_string()),
                street: None,
            },
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_saved_and_forget() {
        let storage = Arc::new(MemoryStore::new());
        let service = service(storage.clone());
        assert_eq!(service.saved(), None);

        let saved = location();
        save_json(storage.as_ref(), DELIVERY_LOCATION_KEY, &saved).unwrap();
        assert_eq!(service.saved(), Some(saved));

        service.forget();
        assert_eq!(service.saved(), None);
    }

    #[test]
    fn test_unreadable_entry_is_ignored() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(DELIVERY_LOCATION_KEY, "[]").unwrap();
        assert_eq!(service(storage).saved(), None);
    }

    #[tokio::test]
    async fn test_locate_rejects_invalid_input_without_lookup() {
        let service = service(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.locate("12-345").await,
            Err(LocationError::InvalidPostalCode(_))
        ));
    }
}
