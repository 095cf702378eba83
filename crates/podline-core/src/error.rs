use thiserror::Error;

/// Core error types for podline operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl CoreError {
    /// Create a new InvalidDateTime error
    pub fn invalid_date_time(datetime: impl Into<String>) -> Self {
        Self::InvalidDateTime(datetime.into())
    }

    /// Create a new InvalidIri error
    pub fn invalid_iri(iri: impl Into<String>) -> Self {
        Self::InvalidIri(iri.into())
    }

    /// Create a new HttpClient error
    pub fn http_client(message: impl Into<String>) -> Self {
        Self::HttpClient(message.into())
    }
}

/// Result type alias for podline core operations
pub type Result<T> = std::result::Result<T, CoreError>;
