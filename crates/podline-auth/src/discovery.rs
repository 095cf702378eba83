//! OpenID Connect Discovery client.
//!
//! Fetches provider metadata from `{issuer}/.well-known/openid-configuration`
//! and checks that the document describes the issuer it was fetched from.
//!
//! # Example
//!
//! ```ignore
//! use podline_auth::discovery::{DiscoveryConfig, OidcDiscoveryClient};
//!
//! let client = OidcDiscoveryClient::new(reqwest::Client::new(), DiscoveryConfig::default());
//! let issuer = Url::parse("https://solidcommunity.net")?;
//! let metadata = client.discover(&issuer).await?;
//! println!("Token endpoint: {}", metadata.token_endpoint);
//! ```
//!
//! # Security Considerations
//!
//! - Only HTTPS issuer URLs are accepted unless `allow_http` is set
//! - The `issuer` in the document must match the issuer that was queried
//! - Response size is limited

use url::Url;

use crate::oidc::ProviderMetadata;

/// Configuration for the discovery client.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum response size in bytes (default: 1 MB).
    pub max_response_size: usize,

    /// Whether to allow HTTP (non-HTTPS) issuer URLs.
    /// Only meant for local development and tests.
    pub allow_http: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_response_size: 1024 * 1024, // 1 MB
            allow_http: false,
        }
    }
}

impl DiscoveryConfig {
    /// Allows HTTP (non-HTTPS) issuer URLs.
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Sets the maximum response size.
    #[must_use]
    pub fn with_max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }
}

/// Errors that can occur during OIDC discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A network error occurred while fetching the discovery document.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP request returned a non-success status code.
    #[error("HTTP error: status {0}")]
    HttpError(u16),

    /// The discovery document could not be parsed as JSON.
    #[error("Failed to parse discovery document: {0}")]
    ParseError(String),

    /// The issuer in the discovery document is not a valid URL.
    #[error("Invalid issuer URL: {0}")]
    InvalidIssuer(String),

    /// The issuer in the discovery document does not match the expected issuer.
    #[error("Issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        /// The expected issuer URL.
        expected: String,
        /// The issuer URL from the discovery document.
        actual: String,
    },

    /// The issuer URL scheme is not allowed.
    #[error("Invalid URL scheme: {0} (only HTTPS is allowed)")]
    InvalidScheme(String),

    /// The response exceeded the maximum allowed size.
    #[error("Response exceeds maximum size of {max_size} bytes")]
    ResponseTooLarge {
        /// The maximum allowed size.
        max_size: usize,
    },
}

/// Client for fetching OIDC provider metadata.
#[derive(Debug, Clone)]
pub struct OidcDiscoveryClient {
    http_client: reqwest::Client,
    config: DiscoveryConfig,
}

impl OidcDiscoveryClient {
    /// Creates a discovery client on top of a shared HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: DiscoveryConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Discovers provider metadata for `issuer`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer URL is not HTTPS (unless `allow_http` is true)
    /// - The document cannot be fetched or parsed
    /// - The issuer in the document does not match the expected issuer
    pub async fn discover(&self, issuer: &Url) -> Result<ProviderMetadata, DiscoveryError> {
        self.validate_issuer_scheme(issuer)?;

        let discovery_url = Self::build_discovery_url(issuer);

        let response = self
            .http_client
            .get(discovery_url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch OIDC discovery from {}: {}", issuer, e);
                DiscoveryError::NetworkError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(DiscoveryError::HttpError(response.status().as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_response_size
        {
            return Err(DiscoveryError::ResponseTooLarge {
                max_size: self.config.max_response_size,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;
        if body.len() > self.config.max_response_size {
            return Err(DiscoveryError::ResponseTooLarge {
                max_size: self.config.max_response_size,
            });
        }

        let document: ProviderMetadata = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(
                "Failed to parse OIDC discovery document from {}: {}",
                issuer,
                e
            );
            DiscoveryError::ParseError(e.to_string())
        })?;

        Self::validate_issuer(&document, issuer)?;

        tracing::debug!(
            "Successfully discovered OIDC configuration for {}",
            document.issuer
        );

        Ok(document)
    }

    /// Checks the issuer URL scheme against the configuration.
    pub fn validate_issuer_scheme(&self, issuer: &Url) -> Result<(), DiscoveryError> {
        match issuer.scheme() {
            "https" => Ok(()),
            "http" if self.config.allow_http => Ok(()),
            other => Err(DiscoveryError::InvalidScheme(other.to_string())),
        }
    }

    /// `{issuer}/.well-known/openid-configuration`
    fn build_discovery_url(issuer: &Url) -> Url {
        let mut discovery_url = issuer.clone();
        let path = issuer.path().trim_end_matches('/');
        discovery_url.set_path(&format!("{path}/.well-known/openid-configuration"));
        discovery_url.set_query(None);
        discovery_url.set_fragment(None);
        discovery_url
    }

    /// The returned issuer must be identical to the one used for the lookup
    /// (compared without trailing slash).
    fn validate_issuer(document: &ProviderMetadata, expected: &Url) -> Result<(), DiscoveryError> {
        let document_issuer = Url::parse(&document.issuer).map_err(|e| {
            DiscoveryError::InvalidIssuer(format!(
                "Invalid issuer URL in document: {} - {}",
                document.issuer, e
            ))
        })?;

        let expected_normalized = expected.as_str().trim_end_matches('/');
        let document_normalized = document_issuer.as_str().trim_end_matches('/');

        if expected_normalized != document_normalized {
            return Err(DiscoveryError::IssuerMismatch {
                expected: expected_normalized.to_string(),
                actual: document_normalized.to_string(),
            });
        }

        Ok(())
    }
}
