//! Postal code (CEP) lookup client.
//!
//! Talks to a ViaCEP-compatible service: `GET {base}/ws/{cep}/json/`
//! returns the address for a CEP, or `{"erro": true}` when the CEP does not
//! exist.

use raiz_core::PostalCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::StorefrontConfig;

/// Errors that can occur when looking up a postal code.
#[derive(Debug, Error)]
pub enum PostalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The postal code does not exist.
    #[error("Postal code not found: {0}")]
    NotFound(PostalCode),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Address data for a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    /// The postal code looked up.
    pub postal_code: PostalCode,
    /// City name.
    pub city: String,
    /// Two-letter state code (e.g., "SP").
    pub state: String,
    /// Neighbourhood, when the CEP is street-level.
    pub district: Option<String>,
    /// Street, when the CEP is street-level.
    pub street: Option<String>,
}

impl Locality {
    /// One-line label (e.g., "Sé, São Paulo - SP").
    #[must_use]
    pub fn label(&self) -> String {
        match &self.district {
            Some(district) => format!("{district}, {} - {}", self.city, self.state),
            None => format!("{} - {}", self.city, self.state),
        }
    }
}

/// Raw ViaCEP response.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag == "true",
            _ => false,
        }
    }

    fn into_locality(self, postal_code: PostalCode) -> Result<Locality, PostalError> {
        if self.localidade.is_empty() || self.uf.is_empty() {
            return Err(PostalError::Parse("response is missing city or state".to_string()));
        }
        Ok(Locality {
            postal_code,
            city: self.localidade,
            state: self.uf,
            district: non_empty(self.bairro),
            street: non_empty(self.logradouro),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Postal code lookup client.
#[derive(Clone)]
pub struct PostalLookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl PostalLookupClient {
    /// Create a new lookup client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, PostalError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.postal_lookup_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the address for a postal code.
    ///
    /// # Errors
    ///
    /// Returns `PostalError::NotFound` for unknown postal codes, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    pub async fn lookup(&self, postal_code: &PostalCode) -> Result<Locality, PostalError> {
        let url = format!("{}/ws/{}/json/", self.base_url, postal_code.digits());

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Postal lookup returned non-success status");
            return Err(PostalError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| PostalError::Parse(e.to_string()))?;

        if body.is_error() {
            return Err(PostalError::NotFound(postal_code.clone()));
        }

        body.into_locality(postal_code.clone())
    }
}
