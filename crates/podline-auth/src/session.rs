//! Session snapshots.

use podline_core::PodFetch;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// Observable login state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Url>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

/// Immutable snapshot of the current session.
///
/// A new snapshot replaces the old one on login completion or logout; holders
/// of an older snapshot keep its fetch capability until they ask again.
#[derive(Debug, Clone)]
pub struct Session {
    info: SessionInfo,
    fetch: PodFetch,
}

impl Session {
    pub fn new(info: SessionInfo, fetch: PodFetch) -> Self {
        Self { info, fetch }
    }

    /// A logged-out session whose fetch sends no credentials.
    pub fn logged_out(http: reqwest::Client) -> Self {
        Self {
            info: SessionInfo::default(),
            fetch: PodFetch::new(http),
        }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// Logged in with a fetch capability that carries credentials.
    pub fn is_logged_in(&self) -> bool {
        self.info.is_logged_in && self.fetch.is_authenticated()
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.info.web_id.as_deref()
    }

    pub fn fetch(&self) -> &PodFetch {
        &self.fetch
    }
}
