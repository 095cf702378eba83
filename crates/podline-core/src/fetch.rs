//! Session-bound HTTP capability.
//!
//! A [`PodFetch`] is the "authenticated fetch" handed out with a session: every
//! request it builds carries the session's credential. Without a credential it
//! behaves like a plain client, which is what a logged-out session holds.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::error::{CoreError, Result};

/// Credential attached to outgoing requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer { token: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// HTTP client bound to the credentials of one session.
#[derive(Clone)]
pub struct PodFetch {
    http: reqwest::Client,
    credential: Option<Arc<Credential>>,
}

impl PodFetch {
    /// Creates a fetch capability without credentials.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            credential: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(reqwest::Client::new())
    }

    /// Creates a fetch capability that sends `token` as a bearer credential.
    pub fn with_bearer(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            http,
            credential: Some(Arc::new(Credential::Bearer {
                token: token.into(),
            })),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Starts a request with the session credential applied.
    pub fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let req = self.http.request(method, url.as_str());
        match self.credential.as_deref() {
            Some(Credential::Bearer { token }) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl fmt::Debug for PodFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodFetch")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// Builds the shared HTTP client with the configured request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("podline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CoreError::http_client(e.to_string()))
}
