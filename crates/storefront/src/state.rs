//! Application state shared across surfaces.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::{DeliveryLocationService, PostalLookupClient};
use crate::shopify::StorefrontClient;
use crate::storage::{FileStore, KeyValueStore};

/// Application state shared across all surfaces.
///
/// This struct is cheaply cloneable via `Arc` and owns the single cart store
/// of the process, so every clone observes the same cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    cart: CartStore<StorefrontClient>,
    location: DeliveryLocationService,
}

impl AppState {
    /// Create a new application state backed by files in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or an HTTP
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let storage = Arc::new(FileStore::open(&config.data_dir)?);
        Self::with_storage(config, storage)
    }

    /// Create a new application state on top of the given storage.
    ///
    /// The cart is restored from `storage` before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let storefront = StorefrontClient::new(&config)?;
        let postal = PostalLookupClient::new(&config)?;
        let cart = CartStore::restore(Arc::clone(&storage), storefront.clone());
        let location = DeliveryLocationService::new(postal, storage);

        tracing::debug!(
            store = %config.shopify.store,
            lines = cart.lines().len(),
            "Storefront state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                cart,
                location,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore<StorefrontClient> {
        &self.inner.cart
    }

    /// Get a reference to the delivery location service.
    #[must_use]
    pub fn location(&self) -> &DeliveryLocationService {
        &self.inner.location
    }
}
