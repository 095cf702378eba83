//! Wiring of the controllers behind one handle.

use std::sync::Arc;

use podline_auth::{
    AuthClient, AuthError, IdentityFlow, Navigator, OidcAuthClient, Session, SessionEvent,
    SessionStorage,
};
use podline_core::{CoreError, Profile, build_http_client};
use podline_dataset::{DynDatasetStore, HttpDatasetStore};
use url::Url;

use crate::config::AppConfig;
use crate::log::ActivityLog;
use crate::profile::{ProfileError, ProfileResolver};
use crate::roundtrip::{RecordDocuments, RoundTripError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    RoundTrip(#[from] RoundTripError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Where the demo document lives for a session.
#[derive(Debug, Clone)]
pub struct DocumentTarget {
    pub profile: Profile,
    pub url: Url,
    /// `true` when the profile had no storage root and the fallback was used.
    pub fallback: bool,
}

pub struct PodApp {
    config: AppConfig,
    flow: IdentityFlow,
    profiles: ProfileResolver,
    documents: RecordDocuments,
    log: Arc<dyn ActivityLog>,
}

impl PodApp {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthClient>,
        navigator: Arc<dyn Navigator>,
        store: DynDatasetStore,
        log: Arc<dyn ActivityLog>,
    ) -> Self {
        let flow = IdentityFlow::new(auth, navigator).with_client_name(&config.identity.client_name);
        let documents = RecordDocuments::new(store.clone(), log.clone())
            .with_document_name(&config.pod.document_name)
            .with_record_title(&config.pod.record_title)
            .with_private_path(&config.pod.private_path);
        Self {
            flow,
            profiles: ProfileResolver::new(store),
            documents,
            log,
            config,
        }
    }

    /// Builds the production stack: OIDC login and HTTP pod access.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(
        config: AppConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        log: Arc<dyn ActivityLog>,
    ) -> Result<Self, AppError> {
        let http = build_http_client(config.request_timeout())?;
        let auth = Arc::new(OidcAuthClient::new(
            http,
            config.oidc_client_config(),
            storage,
        ));
        let store: DynDatasetStore = Arc::new(HttpDatasetStore::new());
        Ok(Self::new(config, auth, navigator, store, log))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn flow(&self) -> &IdentityFlow {
        &self.flow
    }

    pub fn profiles(&self) -> &ProfileResolver {
        &self.profiles
    }

    pub fn documents(&self) -> &RecordDocuments {
        &self.documents
    }

    pub fn log(&self) -> &dyn ActivityLog {
        self.log.as_ref()
    }

    /// Restores the session and reports the login status.
    pub async fn start(&self) -> Result<Session, AppError> {
        let mut restored = self.flow.on_restore();
        let session = self.flow.restore_session().await?;

        if let Some(SessionEvent::Restored { url, .. }) = restored.try_recv() {
            self.log.info(&format!("session restored with url: {url}"));
        }
        self.log.info(if session.is_logged_in() {
            "logged in"
        } else {
            "not logged in"
        });
        if let Some(web_id) = session.subject_id() {
            self.log.info(&format!("Sign in with webId \"{web_id}\""));
        }
        Ok(session)
    }

    /// Starts a login against `issuer`, or the configured issuer when `None`.
    pub async fn login(&self, issuer: Option<&str>) -> Result<Option<String>, AppError> {
        let issuer = issuer.unwrap_or(self.config.identity.issuer.as_str());
        self.log.info(&format!("Logging into solid session with: {issuer}"));
        Ok(self.flow.start_login(issuer).await?)
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.flow.logout().await?;
        self.log.info("logged out");
        Ok(())
    }

    /// Resolves the profile and the demo document URL for `session`.
    ///
    /// Falls back to the private folder at the WebID's origin when the
    /// profile does not name a storage root.
    pub async fn document_target(&self, session: &Session) -> Result<DocumentTarget, AppError> {
        if !session.is_logged_in() {
            return Err(RoundTripError::NotAuthenticated.into());
        }
        let profile = self.profiles.resolve(session).await?;

        if profile.storage_location.is_some() {
            let url = self.documents.target_document_url(&profile)?;
            return Ok(DocumentTarget {
                profile,
                url,
                fallback: false,
            });
        }

        let web_id = session
            .subject_id()
            .ok_or(RoundTripError::NotAuthenticated)?;
        let root = self.documents.fallback_storage_root(web_id)?;
        tracing::info!(%root, "profile has no storage, using fallback root");
        let url = self.documents.document_in(&root)?;
        Ok(DocumentTarget {
            profile,
            url,
            fallback: true,
        })
    }
}
