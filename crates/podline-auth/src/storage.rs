//! Persistence of sessions and in-flight logins.
//!
//! A redirect-based login spans two runs: the first stores a [`PendingLogin`]
//! before sending the user to the provider, the second takes it back out to
//! complete the code exchange. A completed login is kept as a
//! [`PersistedSession`] so later runs can restore it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::AuthError;

/// Tokens and client details of a completed login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub issuer: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_id: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

impl PersistedSession {
    /// Returns `true` if the access token is past its expiry.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("web_id", &self.web_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// State kept between starting a login and handling the redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    pub issuer: String,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub redirect_url: String,
    pub state: String,
    pub code_verifier: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Storage for session state.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load_session(&self) -> Result<Option<PersistedSession>, AuthError>;

    async fn save_session(&self, session: &PersistedSession) -> Result<(), AuthError>;

    /// Removes the persisted session and any pending login.
    async fn clear_session(&self) -> Result<(), AuthError>;

    async fn save_pending(&self, pending: &PendingLogin) -> Result<(), AuthError>;

    /// Returns and removes the pending login.
    async fn take_pending(&self) -> Result<Option<PendingLogin>, AuthError>;

    fn backend_name(&self) -> &'static str;
}

/// JSON files in a directory, one pair per profile:
/// `session.<profile>.json` and `pending.<profile>.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
    profile: String,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            profile: profile.into(),
        }
    }

    /// Storage under `~/.podline`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn in_home(profile: impl Into<String>) -> Result<Self, AuthError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| AuthError::storage("Cannot determine home directory"))?
            .join(".podline");
        Ok(Self::new(dir, profile))
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(format!("session.{}.json", self.profile))
    }

    fn pending_path(&self) -> PathBuf {
        self.dir.join(format!("pending.{}.json", self.profile))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, AuthError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AuthError::storage(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::storage(format!("{}: {e}", path.display()))),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), AuthError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AuthError::storage(format!("{}: {e}", self.dir.display())))?;
        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| AuthError::storage(e.to_string()))?;
        let io_err = |e: std::io::Error| AuthError::storage(format!("{}: {e}", path.display()));

        // Files hold access and refresh tokens: owner-only.
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(path).await.map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(io_err)?;
        }
        file.write_all(&content).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }

    async fn remove(path: &Path) -> Result<(), AuthError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::storage(format!("{}: {e}", path.display()))),
        }
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load_session(&self) -> Result<Option<PersistedSession>, AuthError> {
        Self::read_json(&self.session_path()).await
    }

    async fn save_session(&self, session: &PersistedSession) -> Result<(), AuthError> {
        self.write_json(&self.session_path(), session).await
    }

    async fn clear_session(&self) -> Result<(), AuthError> {
        Self::remove(&self.session_path()).await?;
        Self::remove(&self.pending_path()).await
    }

    async fn save_pending(&self, pending: &PendingLogin) -> Result<(), AuthError> {
        self.write_json(&self.pending_path(), pending).await
    }

    async fn take_pending(&self) -> Result<Option<PendingLogin>, AuthError> {
        let path = self.pending_path();
        let pending = Self::read_json(&path).await?;
        if pending.is_some() {
            Self::remove(&path).await?;
        }
        Ok(pending)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// In-process storage, for tests and short-lived embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    session: Arc<Mutex<Option<PersistedSession>>>,
    pending: Arc<Mutex<Option<PendingLogin>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load_session(&self) -> Result<Option<PersistedSession>, AuthError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save_session(&self, session: &PersistedSession) -> Result<(), AuthError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AuthError> {
        *self.session.lock().await = None;
        *self.pending.lock().await = None;
        Ok(())
    }

    async fn save_pending(&self, pending: &PendingLogin) -> Result<(), AuthError> {
        *self.pending.lock().await = Some(pending.clone());
        Ok(())
    }

    async fn take_pending(&self) -> Result<Option<PendingLogin>, AuthError> {
        Ok(self.pending.lock().await.take())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
