//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for every storefront surface. Surfaces
//! turn errors into a transient [`Toast`] for the shopper and call
//! [`AppError::report`] so platform failures reach Sentry.

use thiserror::Error;

use crate::cart::CartError;
use crate::config::ConfigError;
use crate::services::{LocationError, PostalError};
use crate::shopify::ShopifyError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Delivery location could not be determined.
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<PostalError> for AppError {
    fn from(err: PostalError) -> Self {
        Self::Location(LocationError::Lookup(err))
    }
}

/// Severity of a [`Toast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Something was refused or could not be found; nothing is broken.
    Warning,
    /// An operation failed.
    Error,
}

/// Transient notification shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Severity.
    pub level: ToastLevel,
    /// Shopper-facing message (pt-BR).
    pub message: String,
}

impl Toast {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

const TRY_AGAIN: &str = "Não foi possível concluir a operação. Tente novamente.";

impl AppError {
    /// Whether this is a platform failure worth reporting.
    #[must_use]
    pub fn is_platform_failure(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Shopify(e) | Self::Cart(CartError::Checkout(e)) => {
                !matches!(e, ShopifyError::NotFound(_) | ShopifyError::UserError(_))
            }
            Self::Location(LocationError::Lookup(e)) => !matches!(e, PostalError::NotFound(_)),
            _ => false,
        }
    }

    /// Notification for the shopper.
    ///
    /// Internal details are never included.
    #[must_use]
    pub fn toast(&self) -> Toast {
        match self {
            Self::Config(_) => Toast::error("A loja está indisponível no momento."),
            Self::Shopify(e) => shopify_toast(e),
            Self::Cart(e) => match e {
                CartError::EmptyCart => Toast::warning("Seu carrinho está vazio."),
                CartError::Checkout(e) => match e {
                    ShopifyError::UserError(_) => {
                        Toast::warning("Alguns itens do carrinho não estão mais disponíveis.")
                    }
                    _ => Toast::error("Erro ao criar checkout. Tente novamente."),
                },
                CartError::CartChanged => {
                    Toast::warning("Seu carrinho mudou. Finalize a compra novamente.")
                }
                CartError::VariantUnavailable(_) => {
                    Toast::warning("Esta variante está esgotada.")
                }
                CartError::InvalidQuantity => Toast::warning("Escolha ao menos uma unidade."),
            },
            Self::Location(e) => match e {
                LocationError::InvalidPostalCode(_) => {
                    Toast::warning("CEP inválido. Use o formato 00000-000.")
                }
                LocationError::Lookup(PostalError::NotFound(_)) => {
                    Toast::warning("CEP não encontrado.")
                }
                LocationError::Lookup(_) => {
                    Toast::error("Não foi possível consultar o CEP. Tente novamente.")
                }
            },
            Self::Storage(_) => Toast::error(TRY_AGAIN),
            Self::NotFound(_) => Toast::warning("Produto não encontrado."),
            Self::BadRequest(message) => Toast::warning(message.clone()),
        }
    }

    /// Log the error and capture platform failures to Sentry.
    pub fn report(&self) {
        if self.is_platform_failure() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::info!(error = %self, "Storefront operation refused");
        }
    }
}

fn shopify_toast(e: &ShopifyError) -> Toast {
    match e {
        ShopifyError::NotFound(_) => Toast::warning("Produto não encontrado."),
        ShopifyError::RateLimited(_) => {
            Toast::error("Muitas requisições. Aguarde um instante e tente novamente.")
        }
        ShopifyError::UserError(_) => Toast::warning(TRY_AGAIN),
        ShopifyError::Http(_)
        | ShopifyError::GraphQL(_)
        | ShopifyError::Parse(_)
        | ShopifyError::InvalidData(_) => Toast::error("Erro ao carregar produtos. Tente novamente."),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("variant_id", "gid://shopify/ProductVariant/1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
