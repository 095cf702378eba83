//! Identity flow controller.
//!
//! Ties the auth capability to the page the user is on: restoring a session
//! on startup, cleaning one-time parameters out of the location, sending the
//! user off to log in and logging out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::{AuthClient, LoginRequest, RedirectOptions, canonical_url};
use crate::error::AuthError;
use crate::events::{RestoreSubscription, SessionEvent, SessionEvents};
use crate::navigator::Navigator;
use crate::session::Session;

/// Client display name sent when registering.
pub const DEFAULT_CLIENT_NAME: &str = "demo";

pub struct IdentityFlow {
    auth: Arc<dyn AuthClient>,
    navigator: Arc<dyn Navigator>,
    events: SessionEvents,
    client_name: String,
    restore_delivered: AtomicBool,
}

impl IdentityFlow {
    pub fn new(auth: Arc<dyn AuthClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            events: SessionEvents::default(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            restore_delivered: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    /// Subscribes to restore and logout events.
    ///
    /// Subscribe before calling [`restore_session`](Self::restore_session);
    /// events are not replayed.
    pub fn on_restore(&self) -> RestoreSubscription {
        self.events.subscribe()
    }

    pub async fn session(&self) -> Session {
        self.auth.session().await
    }

    /// Completes a pending redirect login or restores a persisted session.
    ///
    /// With nothing pending, returns the current session unchanged. The first
    /// restore replaces the location with its canonical URL when the two
    /// differ, then emits [`SessionEvent::Restored`]; later restores through
    /// the same controller emit nothing.
    ///
    /// # Errors
    ///
    /// Propagates errors from the auth capability.
    pub async fn restore_session(&self) -> Result<Session, AuthError> {
        let current = self.navigator.current_url();
        let outcome = self
            .auth
            .handle_redirect(
                &current,
                RedirectOptions {
                    restore_previous_session: true,
                },
            )
            .await?;

        if let Some(url) = outcome.restored_url
            && !self.restore_delivered.swap(true, Ordering::SeqCst)
        {
            if current.as_str() != url.as_str() {
                self.navigator.replace_url(&url);
            }
            tracing::debug!(%url, "session restored");
            self.events.send(SessionEvent::Restored {
                url,
                web_id: outcome.session.subject_id().map(str::to_owned),
            });
        }

        Ok(outcome.session)
    }

    /// Sends the user to `issuer` to log in.
    ///
    /// Returns the current subject without doing anything when already logged
    /// in or when `issuer` is blank. Otherwise navigates away and returns
    /// `None`: the login completes in a later [`restore_session`](Self::restore_session).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidIssuer` for a malformed issuer, or any
    /// discovery/registration failure.
    pub async fn start_login(&self, issuer: &str) -> Result<Option<String>, AuthError> {
        let session = self.auth.session().await;
        if session.is_logged_in() || issuer.trim().is_empty() {
            return Ok(session.subject_id().map(str::to_owned));
        }

        let request = LoginRequest {
            issuer: issuer.to_string(),
            client_name: self.client_name.clone(),
            redirect_url: canonical_url(&self.navigator.current_url()),
        };
        let redirect = self.auth.login(&request).await?;
        self.navigator.navigate(&redirect.authorization_url);
        Ok(None)
    }

    /// Ends the session; callers reset their state afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state could not be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.auth.logout().await?;
        self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }
}
