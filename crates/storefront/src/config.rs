//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API public access token
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-07)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override
//! - `STOREFRONT_DATA_DIR` - Local storage directory (default: .raiz)
//! - `POSTAL_LOOKUP_URL` - CEP lookup service base URL (default: <https://viacep.com.br>)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `HTTP_TIMEOUT_SECS` - Timeout for outbound requests (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-07";
const DEFAULT_DATA_DIR: &str = ".raiz";
const DEFAULT_POSTAL_LOOKUP_URL: &str = "https://viacep.com.br";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Directory backing durable local storage (cart, preferences)
    pub data_dir: PathBuf,
    /// Base URL of the postal-code lookup service
    pub postal_lookup_url: String,
    /// How long catalog reads stay cached
    pub catalog_cache_ttl: Duration,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-07)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
    /// Explicit GraphQL endpoint, bypassing the store/version URL
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint for the configured store and API version.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            storefront_token: get_validated_secret("SHOPIFY_STOREFRONT_TOKEN")?,
            endpoint: get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT"),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, numeric
    /// values do not parse, or the access token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR));
        let postal_lookup_url = get_env_or_default("POSTAL_LOOKUP_URL", DEFAULT_POSTAL_LOOKUP_URL)
            .trim_end_matches('/')
            .to_string();
        let catalog_cache_ttl =
            Duration::from_secs(get_u64_or_default("CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?);
        let http_timeout =
            Duration::from_secs(get_u64_or_default("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?);

        Ok(Self {
            shopify,
            data_dir,
            postal_lookup_url,
            catalog_cache_ttl,
            http_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Build a configuration for a store with every optional setting at its
    /// default. Useful for tests and embedding.
    #[must_use]
    pub fn new(shopify: ShopifyStorefrontConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            shopify,
            data_dir: data_dir.into(),
            postal_lookup_url: DEFAULT_POSTAL_LOOKUP_URL.to_string(),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a numeric environment variable with a default value.
fn get_u64_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a token is not empty or a placeholder.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    if token.trim().is_empty() {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must not be empty".to_string(),
        ));
    }

    let lower = token.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_token(&value, key)?;
    Ok(SecretString::from(value))
}

/// Expose the storefront token for request headers.
pub(crate) fn expose_token(config: &ShopifyStorefrontConfig) -> &str {
    config.storefront_token.expose_secret()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: "nacao-raiz.myshopify.com".to_string(),
            api_version: "2025-07".to_string(),
            storefront_token: SecretString::from("8f2c1d9e7a6b5c4d3e2f1a0b9c8d7e6f"),
            endpoint: None,
        }
    }

    #[test]
    fn test_validate_token_placeholder() {
        let result = validate_token("your-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_changeme() {
        assert!(validate_token("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_token_empty() {
        assert!(validate_token("   ", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_token_valid() {
        assert!(validate_token("8f2c1d9e7a6b5c4d3e2f1a0b9c8d7e6f", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_graphql_endpoint_from_store() {
        assert_eq!(
            shopify_config().graphql_endpoint(),
            "https://nacao-raiz.myshopify.com/api/2025-07/graphql.json"
        );
    }

    #[test]
    fn test_graphql_endpoint_override() {
        let config = ShopifyStorefrontConfig {
            endpoint: Some("http://127.0.0.1:9999/graphql.json".to_string()),
            ..shopify_config()
        };
        assert_eq!(config.graphql_endpoint(), "http://127.0.0.1:9999/graphql.json");
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = StorefrontConfig::new(shopify_config(), "/tmp/raiz");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/raiz"));
        assert_eq!(config.postal_lookup_url, "https://viacep.com.br");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_shopify_config_debug_redacts_token() {
        let debug_output = format!("{:?}", shopify_config());

        assert!(debug_output.contains("nacao-raiz.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("8f2c1d9e7a6b5c4d3e2f1a0b9c8d7e6f"));
    }
}
