//! Dynamic client registration (RFC 7591).
//!
//! Solid identity providers accept public clients that register themselves on
//! the fly. The registration carries the display name shown on the consent
//! screen and the redirect URL the provider will send the user back to.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AuthError;

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRegistration {
    pub client_name: String,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub token_endpoint_auth_method: String,
    pub application_type: String,
}

impl ClientRegistration {
    /// Public authorization-code client with refresh tokens.
    #[must_use]
    pub fn public_client(client_name: impl Into<String>, redirect_url: &Url) -> Self {
        Self {
            client_name: client_name.into(),
            redirect_uris: vec![redirect_url.to_string()],
            grant_types: vec!["authorization_code".into(), "refresh_token".into()],
            response_types: vec!["code".into()],
            token_endpoint_auth_method: "none".into(),
            application_type: "native".into(),
        }
    }
}

/// Client credentials issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClient {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Registers `registration` at `endpoint`.
///
/// # Errors
///
/// Returns `AuthError::RegistrationFailed` when the provider rejects the
/// request or answers with something other than a client id.
pub async fn register_client(
    http: &reqwest::Client,
    endpoint: &str,
    registration: &ClientRegistration,
) -> Result<RegisteredClient, AuthError> {
    let response = http.post(endpoint).json(registration).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(endpoint, status = status.as_u16(), "client registration rejected");
        return Err(AuthError::RegistrationFailed(format!(
            "HTTP {status}: {body}"
        )));
    }

    let client: RegisteredClient = response
        .json()
        .await
        .map_err(|e| AuthError::RegistrationFailed(e.to_string()))?;

    tracing::debug!(client_id = %client.client_id, "registered client");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn registers_public_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_partial_json(json!({
                "client_name": "demo",
                "redirect_uris": ["http://localhost:3000/"],
                "token_endpoint_auth_method": "none"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "client_id": "abc123",
                "client_name": "demo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let redirect = Url::parse("http://localhost:3000/").unwrap();
        let registration = ClientRegistration::public_client("demo", &redirect);
        let client = register_client(
            &reqwest::Client::new(),
            &format!("{}/register", server.uri()),
            &registration,
        )
        .await
        .unwrap();
        assert_eq!(client.client_id, "abc123");
        assert_eq!(client.client_secret, None);
    }

    #[tokio::test]
    async fn rejected_registration_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_redirect_uri"))
            .mount(&server)
            .await;

        let redirect = Url::parse("http://localhost:3000/").unwrap();
        let err = register_client(
            &reqwest::Client::new(),
            &format!("{}/register", server.uri()),
            &ClientRegistration::public_client("demo", &redirect),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::RegistrationFailed(msg) if msg.contains("invalid_redirect_uri")));
    }
}
