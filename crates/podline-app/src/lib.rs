//! # podline-app
//!
//! The controllers a podline front end drives:
//!
//! - [`ProfileResolver`] - display name and storage root of the logged-in user
//! - [`RecordDocuments`] - write a record to the pod and read records back
//! - [`PodApp`] - wires both to an [`IdentityFlow`](podline_auth::IdentityFlow)
//!
//! plus configuration loading, tracing setup and the [`ActivityLog`] that
//! carries user-facing lines.

pub mod app;
pub mod config;
pub mod log;
pub mod observability;
pub mod profile;
pub mod roundtrip;

pub use app::{AppError, DocumentTarget, PodApp};
pub use config::AppConfig;
pub use log::{ActivityLog, LogLevel, LogLine, MemoryLog};
pub use profile::{ProfileError, ProfileResolver, profile_document_url};
pub use roundtrip::{DeleteOutcome, RecordDocuments, RoundTripError, StoreReport};
