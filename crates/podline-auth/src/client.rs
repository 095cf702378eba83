//! Authorization-code login against a Solid-OIDC provider.
//!
//! [`AuthClient`] is the seam the identity flow talks to; [`OidcAuthClient`]
//! implements it with discovery, dynamic registration, PKCE and a persisted
//! session that later runs restore (refreshing expired tokens when a refresh
//! token is available).

use std::sync::Arc;

use async_trait::async_trait;
use podline_core::{PodFetch, generate_id};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use url::Url;

use crate::discovery::{DiscoveryConfig, DiscoveryError, OidcDiscoveryClient};
use crate::error::AuthError;
use crate::pkce::{CHALLENGE_METHOD, PkceChallenge, PkceVerifier};
use crate::registration::{ClientRegistration, register_client};
use crate::session::{Session, SessionInfo};
use crate::storage::{PendingLogin, PersistedSession, SessionStorage};
use crate::token::{self, ClientAuth, IdTokenClaims, TokenResponse};

/// Query parameters that only make sense once.
const ONE_TIME_PARAMS: &[&str] = &[
    "code",
    "state",
    "iss",
    "error",
    "error_description",
    "session_state",
];

/// Parameters for starting a login.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Identity provider, as typed by the user.
    pub issuer: String,
    /// Display name registered for this client.
    pub client_name: String,
    /// Where the provider sends the user back to.
    pub redirect_url: Url,
}

/// Where to send the user to log in.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub authorization_url: Url,
    pub state: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectOptions {
    /// Also bring back a session persisted by an earlier run.
    pub restore_previous_session: bool,
}

/// Result of handling the current URL.
#[derive(Debug, Clone)]
pub struct RedirectOutcome {
    pub session: Session,
    /// Set when a session was restored: the canonical URL of the page.
    pub restored_url: Option<Url>,
}

/// The auth capability.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Current session snapshot.
    async fn session(&self) -> Session;

    /// Prepares a redirect-based login.
    async fn login(&self, request: &LoginRequest) -> Result<LoginRedirect, AuthError>;

    /// Completes a login out of `current_url`, or restores a persisted session.
    async fn handle_redirect(
        &self,
        current_url: &Url,
        options: RedirectOptions,
    ) -> Result<RedirectOutcome, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}

/// `url` without its one-time auth parameters.
pub fn canonical_url(url: &Url) -> Url {
    let mut canonical = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !ONE_TIME_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        canonical.set_query(None);
    } else {
        canonical.query_pairs_mut().clear().extend_pairs(kept);
    }
    canonical
}

/// Configuration for [`OidcAuthClient`].
#[derive(Debug, Clone)]
pub struct OidcClientConfig {
    /// Pre-registered client id; registers dynamically when `None`.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub discovery: DiscoveryConfig,
}

impl Default for OidcClientConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            scopes: vec!["openid".into(), "offline_access".into(), "webid".into()],
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Solid-OIDC relying party.
pub struct OidcAuthClient {
    http: reqwest::Client,
    config: OidcClientConfig,
    discovery: OidcDiscoveryClient,
    storage: Arc<dyn SessionStorage>,
    session: RwLock<Session>,
}

impl OidcAuthClient {
    pub fn new(
        http: reqwest::Client,
        config: OidcClientConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let discovery = OidcDiscoveryClient::new(http.clone(), config.discovery.clone());
        Self {
            session: RwLock::new(Session::logged_out(http.clone())),
            http,
            config,
            discovery,
            storage,
        }
    }

    fn parse_issuer(&self, raw: &str) -> Result<Url, AuthError> {
        let issuer = Url::parse(raw.trim())
            .map_err(|e| AuthError::invalid_issuer(format!("{raw}: {e}")))?;
        if issuer.host_str().is_none() {
            return Err(AuthError::invalid_issuer(format!("{raw}: missing host")));
        }
        self.discovery
            .validate_issuer_scheme(&issuer)
            .map_err(|e| match e {
                DiscoveryError::InvalidScheme(scheme) => {
                    AuthError::invalid_issuer(format!("{raw}: scheme {scheme} is not allowed"))
                }
                other => AuthError::DiscoveryFailed(other),
            })?;
        Ok(issuer)
    }

    fn build_session(&self, persisted: &PersistedSession) -> Session {
        let info = SessionInfo {
            is_logged_in: true,
            web_id: persisted.web_id.clone(),
            issuer: Url::parse(&persisted.issuer).ok(),
            expires_at: persisted.expires_at,
        };
        Session::new(
            info,
            PodFetch::with_bearer(self.http.clone(), persisted.access_token.clone()),
        )
    }

    async fn complete_login(
        &self,
        current_url: &Url,
        code: &str,
        returned_state: Option<&str>,
        returned_issuer: Option<&str>,
    ) -> Result<Option<RedirectOutcome>, AuthError> {
        let Some(pending) = self.storage.take_pending().await? else {
            if self.session.read().await.is_logged_in() {
                return Ok(None);
            }
            return Err(AuthError::NoPendingLogin);
        };

        if returned_state != Some(pending.state.as_str()) {
            return Err(AuthError::StateMismatch);
        }
        if let Some(iss) = returned_issuer
            && !same_issuer(iss, &pending.issuer)
        {
            return Err(AuthError::invalid_issuer(format!(
                "redirect came from {iss}, expected {}",
                pending.issuer
            )));
        }

        let verifier = PkceVerifier::new(pending.code_verifier.clone())?;
        let client = ClientAuth {
            client_id: &pending.client_id,
            client_secret: pending.client_secret.as_deref(),
        };
        let tokens = token::exchange_code(
            &self.http,
            &pending.token_endpoint,
            client,
            code,
            &pending.redirect_url,
            verifier.as_str(),
        )
        .await?;

        let web_id = web_id_from(&tokens, &pending.issuer)?;
        let persisted = PersistedSession {
            issuer: pending.issuer.clone(),
            token_endpoint: pending.token_endpoint.clone(),
            client_id: pending.client_id.clone(),
            client_secret: pending.client_secret.clone(),
            web_id,
            expires_at: tokens.expires_at(OffsetDateTime::now_utc()),
            refresh_token: tokens.refresh_token.clone(),
            access_token: tokens.access_token,
        };
        self.storage.save_session(&persisted).await?;

        let session = self.build_session(&persisted);
        *self.session.write().await = session.clone();
        tracing::info!(web_id = ?persisted.web_id, issuer = %persisted.issuer, "login completed");

        Ok(Some(RedirectOutcome {
            session,
            restored_url: Some(canonical_url(current_url)),
        }))
    }

    /// Brings back a persisted session; `None` when there is nothing usable.
    async fn revive(&self) -> Result<Option<Session>, AuthError> {
        let Some(mut persisted) = self.storage.load_session().await? else {
            return Ok(None);
        };

        if persisted.is_expired(OffsetDateTime::now_utc()) {
            let Some(refresh_token) = persisted.refresh_token.clone() else {
                tracing::info!("persisted session expired");
                self.storage.clear_session().await?;
                return Ok(None);
            };

            let client = ClientAuth {
                client_id: &persisted.client_id,
                client_secret: persisted.client_secret.as_deref(),
            };
            match token::refresh(&self.http, &persisted.token_endpoint, client, &refresh_token)
                .await
            {
                Ok(tokens) => {
                    if let Some(web_id) = web_id_from(&tokens, &persisted.issuer)? {
                        persisted.web_id = Some(web_id);
                    }
                    persisted.expires_at = tokens.expires_at(OffsetDateTime::now_utc());
                    if tokens.refresh_token.is_some() {
                        persisted.refresh_token = tokens.refresh_token;
                    }
                    persisted.access_token = tokens.access_token;
                    self.storage.save_session(&persisted).await?;
                    tracing::debug!("refreshed persisted session");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not refresh persisted session");
                    self.storage.clear_session().await?;
                    return Ok(None);
                }
            }
        }

        Ok(Some(self.build_session(&persisted)))
    }
}

fn same_issuer(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

fn web_id_from(tokens: &TokenResponse, expected_issuer: &str) -> Result<Option<String>, AuthError> {
    let Some(id_token) = &tokens.id_token else {
        return Ok(None);
    };
    let claims = IdTokenClaims::decode_unverified(id_token)?;
    if !same_issuer(&claims.iss, expected_issuer) {
        return Err(AuthError::InvalidIdToken(format!(
            "issued by {}, expected {expected_issuer}",
            claims.iss
        )));
    }
    Ok(claims.web_id())
}

#[async_trait]
impl AuthClient for OidcAuthClient {
    async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginRedirect, AuthError> {
        let issuer = self.parse_issuer(&request.issuer)?;
        let metadata = self.discovery.discover(&issuer).await?;

        let (client_id, client_secret) = match &self.config.client_id {
            Some(id) => (id.clone(), self.config.client_secret.clone()),
            None => {
                let endpoint = metadata
                    .registration_endpoint
                    .as_deref()
                    .ok_or_else(|| AuthError::MissingClientId(metadata.issuer.clone()))?;
                let registration =
                    ClientRegistration::public_client(&request.client_name, &request.redirect_url);
                let client = register_client(&self.http, endpoint, &registration).await?;
                (client.client_id, client.client_secret)
            }
        };

        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier);
        let state = generate_id();

        let mut authorization_url = Url::parse(&metadata.authorization_endpoint)
            .map_err(|e| AuthError::DiscoveryFailed(DiscoveryError::ParseError(e.to_string())))?;
        authorization_url
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &client_id)
            .append_pair("redirect_uri", request.redirect_url.as_str())
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("code_challenge", challenge.as_str())
            .append_pair("code_challenge_method", CHALLENGE_METHOD)
            .append_pair("prompt", "consent");

        self.storage
            .save_pending(&PendingLogin {
                issuer: metadata.issuer.clone(),
                token_endpoint: metadata.token_endpoint.clone(),
                client_id,
                client_secret,
                redirect_url: request.redirect_url.to_string(),
                state: state.clone(),
                code_verifier: verifier.into_inner(),
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;

        tracing::info!(issuer = %metadata.issuer, "login started");
        Ok(LoginRedirect {
            authorization_url,
            state,
        })
    }

    async fn handle_redirect(
        &self,
        current_url: &Url,
        options: RedirectOptions,
    ) -> Result<RedirectOutcome, AuthError> {
        let param = |name: &str| {
            current_url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        if let Some(error) = param("error") {
            self.storage.take_pending().await?;
            return Err(AuthError::authorization(
                error,
                param("error_description").unwrap_or_default(),
            ));
        }

        if let Some(code) = param("code") {
            let state = param("state");
            let iss = param("iss");
            if let Some(outcome) = self
                .complete_login(current_url, &code, state.as_deref(), iss.as_deref())
                .await?
            {
                return Ok(outcome);
            }
        } else if options.restore_previous_session {
            let logged_in = self.session.read().await.is_logged_in();
            if !logged_in && let Some(session) = self.revive().await? {
                *self.session.write().await = session.clone();
                tracing::info!(web_id = ?session.subject_id(), "session restored");
                return Ok(RedirectOutcome {
                    session,
                    restored_url: Some(canonical_url(current_url)),
                });
            }
        }

        Ok(RedirectOutcome {
            session: self.session.read().await.clone(),
            restored_url: None,
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.storage.clear_session().await?;
        *self.session.write().await = Session::logged_out(self.http.clone());
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;

    fn client() -> OidcAuthClient {
        OidcAuthClient::new(
            reqwest::Client::new(),
            OidcClientConfig::default(),
            Arc::new(MemorySessionStorage::new()),
        )
    }

    #[test]
    fn canonical_url_drops_auth_parameters() {
        let url = Url::parse("http://localhost:3000/app?code=abc&state=xyz&iss=https%3A%2F%2Fidp&tab=2#top")
            .unwrap();
        assert_eq!(
            canonical_url(&url).as_str(),
            "http://localhost:3000/app?tab=2#top"
        );

        let url = Url::parse("http://localhost:3000/?code=abc&state=xyz").unwrap();
        assert_eq!(canonical_url(&url).as_str(), "http://localhost:3000/");

        let url = Url::parse("http://localhost:3000/plain").unwrap();
        assert_eq!(canonical_url(&url), url);
    }

    #[test]
    fn malformed_issuers_are_rejected() {
        let client = client();
        for raw in ["not a url", "mailto:someone@example.org", "http://idp.example"] {
            let err = client.parse_issuer(raw).unwrap_err();
            assert!(matches!(err, AuthError::InvalidIssuer(_)), "{raw}: {err}");
        }
        assert!(client.parse_issuer("https://idp.example").is_ok());
    }

    #[tokio::test]
    async fn plain_url_without_stored_session_stays_logged_out() {
        let client = client();
        let url = Url::parse("http://localhost:3000/").unwrap();
        let outcome = client
            .handle_redirect(
                &url,
                RedirectOptions {
                    restore_previous_session: true,
                },
            )
            .await
            .unwrap();
        assert!(!outcome.session.is_logged_in());
        assert!(outcome.restored_url.is_none());
    }

    #[tokio::test]
    async fn provider_error_is_surfaced() {
        let client = client();
        let url = Url::parse(
            "http://localhost:3000/?error=access_denied&error_description=user+cancelled",
        )
        .unwrap();
        let err = client
            .handle_redirect(&url, RedirectOptions::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AuthError::Authorization { error, description } if error == "access_denied" && description == "user cancelled")
        );
    }

    #[tokio::test]
    async fn code_without_pending_login_is_rejected() {
        let client = client();
        let url = Url::parse("http://localhost:3000/?code=abc&state=xyz").unwrap();
        let err = client
            .handle_redirect(&url, RedirectOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoPendingLogin));
    }
}
