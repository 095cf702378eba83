//! Token endpoint requests and ID token claims.
//!
//! The ID token arrives over the TLS connection to the token endpoint the
//! client itself chose through discovery, so its claims are read without
//! verifying the signature (OpenID Connect Core 1.0, section 3.1.3.7).

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::AuthError;

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry computed from `expires_in`.
    ///
    /// A lifetime past the representable date range counts as no expiry.
    #[must_use]
    pub fn expires_at(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        self.expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| now.checked_add(time::Duration::seconds(secs)))
    }
}

/// Error body defined by RFC 6749, section 5.2.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client identity used at the token endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ClientAuth<'a> {
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
}

/// Exchanges an authorization code for tokens.
///
/// # Errors
///
/// Returns `AuthError::TokenExchangeFailed` if the provider rejects the code.
pub async fn exchange_code(
    http: &reqwest::Client,
    token_endpoint: &str,
    client: ClientAuth<'_>,
    code: &str,
    redirect_uri: &str,
    code_verifier: &str,
) -> Result<TokenResponse, AuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("code_verifier", code_verifier),
        ("client_id", client.client_id),
    ];
    post_token(http, token_endpoint, client, &params).await
}

/// Uses a refresh token to obtain a fresh access token.
///
/// # Errors
///
/// Returns `AuthError::TokenExchangeFailed` if the refresh token was rejected.
pub async fn refresh(
    http: &reqwest::Client,
    token_endpoint: &str,
    client: ClientAuth<'_>,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client.client_id),
    ];
    post_token(http, token_endpoint, client, &params).await
}

async fn post_token(
    http: &reqwest::Client,
    token_endpoint: &str,
    client: ClientAuth<'_>,
    params: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let mut request = http
        .post(token_endpoint)
        .header("Accept", "application/json")
        .form(params);
    if let Some(secret) = client.client_secret {
        request = request.basic_auth(client.client_id, Some(secret));
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<OAuthErrorBody>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {desc}", err.error),
                None => err.error,
            },
            Err(_) => format!("HTTP {status}: {body}"),
        };
        tracing::warn!(token_endpoint, status = status.as_u16(), "token request failed");
        return Err(AuthError::TokenExchangeFailed(message));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::TokenExchangeFailed(format!("Invalid token response: {e}")))
}

/// Claims read from the ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub sub: String,
    #[serde(default)]
    pub webid: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl IdTokenClaims {
    /// Decodes the payload segment of a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidIdToken` if the token is not three
    /// dot-separated segments or the payload is not base64url JSON.
    pub fn decode_unverified(id_token: &str) -> Result<Self, AuthError> {
        let mut segments = id_token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(AuthError::InvalidIdToken("not a compact JWT".into())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::InvalidIdToken(format!("payload is not base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::InvalidIdToken(format!("invalid claims: {e}")))
    }

    /// The WebID: the `webid` claim, or `sub` when it is itself an HTTP(S) URL.
    #[must_use]
    pub fn web_id(&self) -> Option<String> {
        if let Some(webid) = &self.webid {
            return Some(webid.clone());
        }
        match url::Url::parse(&self.sub) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(self.sub.clone()),
            _ => None,
        }
    }
}
