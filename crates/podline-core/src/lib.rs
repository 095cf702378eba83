//! # podline-core
//!
//! Shared types for the podline workspace: records and profiles, the
//! `xsd:dateTime` wrapper, vocabulary IRIs and the session-bound fetch
//! capability.

pub mod error;
pub mod fetch;
pub mod id;
pub mod record;
pub mod time;
pub mod vocab;

pub use error::{CoreError, Result};
pub use fetch::{Credential, PodFetch, build_http_client};
pub use id::{generate_id, is_valid_fragment_id};
pub use record::{Profile, Record};
pub use time::{PodDateTime, now_utc};
