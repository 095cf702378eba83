use serde::{Deserialize, Serialize};
use url::Url;

use crate::id::generate_id;
use crate::time::{PodDateTime, now_utc};

/// A small titled, timestamped record kept in a pod document.
///
/// Records built locally always carry a title and a timestamp. Records read
/// back from a document carry whatever the document holds: a missing field
/// stays `None`, it is never replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<PodDateTime>,
}

impl Record {
    /// Builds a fresh record with a random identifier stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: generate_id(),
            title: Some(title.into()),
            timestamp: Some(now_utc()),
        }
    }

    /// Returns `true` when either field is missing.
    pub fn is_partial(&self) -> bool {
        self.title.is_none() || self.timestamp.is_none()
    }
}

/// Read-only projection of a user's profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: Option<String>,
    pub storage_location: Option<Url>,
}

impl Profile {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.storage_location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_complete() {
        let record = Record::new("some title");
        assert_eq!(record.title.as_deref(), Some("some title"));
        assert!(record.timestamp.is_some());
        assert!(!record.is_partial());
    }

    #[test]
    fn partial_record_serializes_without_missing_fields() {
        let record = Record {
            identifier: "123".into(),
            title: None,
            timestamp: None,
        };
        assert!(record.is_partial());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "identifier": "123" }));
    }

    #[test]
    fn default_profile_is_empty() {
        assert!(Profile::default().is_empty());
    }
}
