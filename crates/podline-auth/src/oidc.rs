//! OpenID Provider metadata.
//!
//! Subset of the fields defined by
//! [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)
//! that a relying party needs to run the authorization-code flow.

use serde::{Deserialize, Serialize};

/// Provider metadata returned from `.well-known/openid-configuration`.
///
/// # Example
///
/// ```ignore
/// let json = r#"{
///     "issuer": "https://idp.example",
///     "authorization_endpoint": "https://idp.example/authorize",
///     "token_endpoint": "https://idp.example/token"
/// }"#;
///
/// let doc: ProviderMetadata = serde_json::from_str(json)?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    // ----- Required Fields -----
    /// URL that the OP asserts as its Issuer Identifier.
    pub issuer: String,

    /// URL of the OP's Authorization Endpoint.
    pub authorization_endpoint: String,

    /// URL of the OP's Token Endpoint.
    pub token_endpoint: String,

    // ----- Optional Fields -----
    /// URL of the OP's JSON Web Key Set document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// URL of the OP's Dynamic Client Registration Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<String>,

    /// URL of the OP's UserInfo Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// URL at the OP to which an RP can redirect to log the End-User out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,

    /// OAuth 2.0 scope values that this server supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    /// PKCE code challenge methods supported by this authorization server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_methods_supported: Option<Vec<String>>,

    /// Solid-OIDC versions the OP implements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid_oidc_supported: Option<String>,
}

impl ProviderMetadata {
    /// Returns `true` if the provider advertises the `webid` scope.
    #[must_use]
    pub fn supports_webid_scope(&self) -> bool {
        self.scopes_supported
            .as_ref()
            .is_some_and(|scopes| scopes.iter().any(|s| s == "webid"))
    }

    /// Returns `true` if dynamic client registration is available.
    #[must_use]
    pub fn supports_registration(&self) -> bool {
        self.registration_endpoint.is_some()
    }
}
