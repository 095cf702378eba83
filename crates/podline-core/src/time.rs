use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// An `xsd:dateTime` value as written to and read from pod documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PodDateTime(pub OffsetDateTime);

impl PodDateTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Lexical form used in documents (RFC 3339).
    pub fn to_lexical(&self) -> Result<String> {
        self.0
            .format(&Rfc3339)
            .map_err(|e| CoreError::invalid_date_time(e.to_string()))
    }
}

impl fmt::Display for PodDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for PodDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &Rfc3339).map_err(|e| {
            CoreError::invalid_date_time(format!("Failed to parse date-time '{s}': {e}"))
        })?;
        Ok(PodDateTime(datetime))
    }
}

impl Serialize for PodDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self.0.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for PodDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PodDateTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Current UTC time truncated to whole milliseconds, the precision most pod
/// servers keep for `xsd:dateTime` literals.
pub fn now_utc() -> PodDateTime {
    let now = OffsetDateTime::now_utc();
    PodDateTime(now.replace_millisecond(now.millisecond()).unwrap_or(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_display() {
        let dt = PodDateTime::new(datetime!(2023-05-15 14:30:00 UTC));
        assert_eq!(dt.to_string(), "2023-05-15T14:30:00Z");
        assert_eq!(dt.to_lexical().unwrap(), "2023-05-15T14:30:00Z");
    }

    #[test]
    fn test_from_str_with_offset() {
        let dt = PodDateTime::from_str("2023-05-15T14:30:00+02:00").unwrap();
        assert_eq!(
            dt.0.to_offset(time::UtcOffset::UTC),
            datetime!(2023-05-15 12:30:00 UTC)
        );
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(PodDateTime::from_str("invalid-date").is_err());
        assert!(PodDateTime::from_str("2023-13-01T00:00:00Z").is_err());
        assert!(PodDateTime::from_str("").is_err());
    }

    #[test]
    fn test_serde() {
        let dt = PodDateTime::new(datetime!(2023-05-15 14:30:00.250 UTC));
        let json = serde_json::to_string(&dt).unwrap();
        assert!(json.starts_with("\"2023-05-15T14:30:00.25"));
        let back: PodDateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn test_now_is_millisecond_precision() {
        let now = now_utc();
        assert_eq!(now.0.nanosecond() % 1_000_000, 0);
        let reparsed = PodDateTime::from_str(&now.to_string()).unwrap();
        assert_eq!(reparsed, now);
    }
}
