//! # podline-auth
//!
//! Solid-OIDC login and session lifecycle for podline.
//!
//! ## Overview
//!
//! - [`IdentityFlow`] - restores sessions on startup, starts logins, logs out
//! - [`AuthClient`] - the auth capability; [`OidcAuthClient`] implements it
//!   with discovery, dynamic client registration, PKCE and token exchange
//! - [`Session`] - immutable snapshot carrying the session-bound fetch
//! - [`SessionStorage`] - persisted sessions and in-flight logins
//! - [`Navigator`] - the location the user is looking at
//!
//! ## Example
//!
//! ```ignore
//! let storage = Arc::new(FileSessionStorage::in_home("default")?);
//! let auth = Arc::new(OidcAuthClient::new(http, OidcClientConfig::default(), storage));
//! let flow = IdentityFlow::new(auth, navigator);
//!
//! let mut restored = flow.on_restore();
//! let session = flow.restore_session().await?;
//! if !session.is_logged_in() {
//!     flow.start_login("https://solidcommunity.net").await?;
//! }
//! ```

pub mod client;
pub mod discovery;
mod error;
pub mod events;
pub mod flow;
pub mod navigator;
pub mod oidc;
pub mod pkce;
pub mod registration;
mod session;
pub mod storage;
pub mod token;

pub use client::{
    AuthClient, LoginRedirect, LoginRequest, OidcAuthClient, OidcClientConfig, RedirectOptions,
    RedirectOutcome, canonical_url,
};
pub use discovery::{DiscoveryConfig, DiscoveryError, OidcDiscoveryClient};
pub use error::AuthError;
pub use events::{RestoreSubscription, SessionEvent, SessionEvents};
pub use flow::{DEFAULT_CLIENT_NAME, IdentityFlow};
pub use navigator::{MemoryNavigator, Navigator};
pub use session::{Session, SessionInfo};
pub use storage::{
    FileSessionStorage, MemorySessionStorage, PendingLogin, PersistedSession, SessionStorage,
};
