//! Error types for login and session handling.

use crate::discovery::DiscoveryError;
use crate::pkce::PkceError;

/// Errors that can occur while logging in, completing a redirect or
/// restoring a session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The issuer passed to login is not a usable URL.
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),

    /// The return URL could not be parsed.
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),

    /// Failed to fetch the provider's discovery document.
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(#[from] DiscoveryError),

    /// Dynamic client registration was refused or unreadable.
    #[error("Client registration failed: {0}")]
    RegistrationFailed(String),

    /// The provider supports no registration and no client id is configured.
    #[error("No client id configured and provider {0} does not support dynamic registration")]
    MissingClientId(String),

    /// Token exchange or refresh with the provider failed.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The ID token could not be decoded or does not match the login.
    #[error("Invalid ID token: {0}")]
    InvalidIdToken(String),

    /// The provider redirected back with an error.
    #[error("Authorization failed: {error} - {description}")]
    Authorization {
        /// The OAuth error code.
        error: String,
        /// Optional error description.
        description: String,
    },

    /// A redirect carried an authorization code but no login was started.
    #[error("No pending login for this redirect")]
    NoPendingLogin,

    /// The `state` parameter does not match the pending login.
    #[error("State mismatch: redirect does not belong to the pending login")]
    StateMismatch,

    /// A stored PKCE verifier is malformed.
    #[error("PKCE error: {0}")]
    Pkce(#[from] PkceError),

    /// Reading or writing persisted session state failed.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl AuthError {
    /// Creates an `InvalidIssuer` error.
    #[must_use]
    pub fn invalid_issuer(message: impl Into<String>) -> Self {
        Self::InvalidIssuer(message.into())
    }

    /// Creates an `Authorization` error from redirect parameters.
    #[must_use]
    pub fn authorization(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Authorization {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
