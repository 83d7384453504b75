//! Shopify Storefront API client implementation.
//!
//! Sends hand-written GraphQL documents through `graphql_client::QueryBody`
//! with `reqwest` 0.13 for HTTP. Caches products and collections using `moka`.

mod cache;
mod conversions;
mod queries;

use std::sync::Arc;

use graphql_client::{QueryBody, Response};
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::cart::CheckoutGateway;
use crate::config::{StorefrontConfig, expose_token};
use crate::shopify::types::{CheckoutLineInput, Checkout, Collection, Product, ProductConnection};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::{CacheKey, CacheValue};
use conversions::{
    convert_checkout, convert_collection, convert_product, convert_product_connection,
    convert_user_errors,
};
use queries::{
    CREATE_CHECKOUT, CartInput, CartLineInput, CreateCheckoutData, CreateCheckoutVariables,
    GET_COLLECTION_BY_HANDLE, GET_PRODUCT_BY_HANDLE, GET_PRODUCTS, GetCollectionByHandleData,
    GetCollectionByHandleVariables, GetProductByHandleData, GetProductByHandleVariables,
    GetProductsData, GetProductsVariables,
};

/// Largest page the Storefront API accepts for `first`.
const MAX_PAGE_SIZE: u32 = 250;

/// Maximum cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to products, collections, and checkout creation.
/// Catalog reads are cached for the configured TTL.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ShopifyError> {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint: config.shopify.graphql_endpoint(),
                access_token: expose_token(&config.shopify).to_string(),
                cache,
            }),
        })
    }

    /// Execute a GraphQL operation.
    async fn execute<V, T>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<T, ShopifyError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request_body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Storefront-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::graphql_message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: Response<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::graphql_message("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = GetProductByHandleVariables {
            handle: handle.to_string(),
        };

        let data: GetProductByHandleData = self
            .execute("GetProductByHandle", GET_PRODUCT_BY_HANDLE, variables)
            .await?;

        let product_data = data
            .product
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        let product = convert_product(product_data)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the first page of products, optionally filtered by a Storefront
    /// search query.
    ///
    /// Products come back in catalog order. `first` is clamped to the API's
    /// page limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: u32,
        query: Option<&str>,
    ) -> Result<ProductConnection, ShopifyError> {
        let first = i64::from(first.clamp(1, MAX_PAGE_SIZE));
        let cache_key = CacheKey::Products { first };

        // Check cache (only for default queries without search)
        if query.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = GetProductsVariables {
            first,
            query: query.map(str::to_string),
        };

        let data: GetProductsData = self
            .execute("GetProducts", GET_PRODUCTS, variables)
            .await?;

        let connection = convert_product_connection(data.products)?;

        if query.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(connection.clone()))
                .await;
        }

        Ok(connection)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection and its first page of products by handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_by_handle(
        &self,
        handle: &str,
        first: u32,
    ) -> Result<Collection, ShopifyError> {
        let first = i64::from(first.clamp(1, MAX_PAGE_SIZE));
        let cache_key = CacheKey::Collection {
            handle: handle.to_string(),
            first,
        };

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = GetCollectionByHandleVariables {
            handle: handle.to_string(),
            first,
        };

        let data: GetCollectionByHandleData = self
            .execute("GetCollectionByHandle", GET_COLLECTION_BY_HANDLE, variables)
            .await?;

        let collection_data = data
            .collection
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        let collection = convert_collection(collection_data)?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    // =========================================================================
    // Checkout (not cached - mutable state)
    // =========================================================================

    /// Create a checkout session for the given lines.
    ///
    /// The returned URL carries `channel=online_store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails or user errors are returned.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_checkout(
        &self,
        lines: &[CheckoutLineInput],
    ) -> Result<Checkout, ShopifyError> {
        let variables = CreateCheckoutVariables {
            input: CartInput {
                lines: lines
                    .iter()
                    .map(|line| CartLineInput {
                        merchandise_id: line.variant_id.to_string(),
                        quantity: i64::from(line.quantity),
                    })
                    .collect(),
            },
        };

        let data: CreateCheckoutData = self
            .execute("CreateCheckout", CREATE_CHECKOUT, variables)
            .await?;

        if let Some(result) = data.cart_create {
            if !result.user_errors.is_empty() {
                return Err(ShopifyError::UserError(
                    convert_user_errors(result.user_errors)
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join("; "),
                ));
            }

            if let Some(cart) = result.cart {
                return convert_checkout(cart);
            }
        }

        Err(ShopifyError::graphql_message("Failed to create checkout"))
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, handle: &str) {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(handle.to_string()))
            .await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl CheckoutGateway for StorefrontClient {
    async fn create_checkout(&self, lines: &[CheckoutLineInput]) -> Result<Checkout, ShopifyError> {
        Self::create_checkout(self, lines).await
    }
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: e.message,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}
