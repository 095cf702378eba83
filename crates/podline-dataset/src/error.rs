//! Errors for reading, writing and deleting pod documents.

use std::fmt;

/// Errors that can occur while moving datasets to and from a pod.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The document does not exist (HTTP 404 or 410).
    #[error("Document not found: {url}")]
    NotFound {
        /// Address of the missing document.
        url: String,
    },

    /// The server refused the request for lack of (sufficient) credentials.
    #[error("Access denied to {url} (HTTP {status})")]
    Unauthorized {
        /// Address of the document.
        url: String,
        /// HTTP status returned (401 or 403).
        status: u16,
    },

    /// Any other non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Address of the document.
        url: String,
        /// HTTP status returned.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error for {url}: {message}")]
    Network {
        /// Address of the document.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The response body could not be read as a dataset.
    #[error("Failed to parse document {url}: {message}")]
    Parse {
        /// Address of the document.
        url: String,
        /// Parser error description.
        message: String,
    },

    /// The dataset could not be serialized for writing.
    #[error("Failed to serialize dataset: {message}")]
    Serialize {
        /// Serializer error description.
        message: String,
    },
}

impl DatasetError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(url: impl Into<String>, status: u16) -> Self {
        Self::Unauthorized {
            url: url.into(),
            status,
        }
    }

    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Serialize` error.
    #[must_use]
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status to the matching error.
    #[must_use]
    pub fn from_status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        match status {
            404 | 410 => Self::not_found(url),
            401 | 403 => Self::unauthorized(url, status),
            _ => Self::http(url, status, body),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the server rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Unauthorized { .. } => ErrorCategory::Access,
            Self::Http { .. } => ErrorCategory::Server,
            Self::Network { .. } => ErrorCategory::Network,
            Self::Parse { .. } | Self::Serialize { .. } => ErrorCategory::Format,
        }
    }
}

/// Categories of dataset errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Document missing.
    NotFound,
    /// Authentication or authorization refused.
    Access,
    /// Server answered with an unexpected status.
    Server,
    /// Transport failure.
    Network,
    /// Body could not be parsed or produced.
    Format,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Access => write!(f, "access"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::Format => write!(f, "format"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::not_found("https://pod.example/doc");
        assert_eq!(err.to_string(), "Document not found: https://pod.example/doc");

        let err = DatasetError::unauthorized("https://pod.example/doc", 401);
        assert_eq!(
            err.to_string(),
            "Access denied to https://pod.example/doc (HTTP 401)"
        );
    }

    #[test]
    fn test_from_status() {
        assert!(DatasetError::from_status("u", 404, "").is_not_found());
        assert!(DatasetError::from_status("u", 410, "").is_not_found());
        assert!(DatasetError::from_status("u", 403, "").is_unauthorized());
        assert!(matches!(
            DatasetError::from_status("u", 500, "boom"),
            DatasetError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            DatasetError::not_found("u").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            DatasetError::network("u", "reset").category(),
            ErrorCategory::Network
        );
        assert_eq!(
            DatasetError::parse("u", "bad json").category(),
            ErrorCategory::Format
        );
        assert_eq!(ErrorCategory::Access.to_string(), "access");
    }
}
