//! Error types for Snyk API operations.

use thiserror::Error;

/// Errors that can occur during Snyk API operations.
#[derive(Debug, Error)]
pub enum SnykError {
    /// Configuration is missing or incomplete.
    #[error("Snyk configuration required: {0}")]
    ConfigMissing(String),

    /// A caller-supplied value is outside its allowed set.
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The operation is not available for this kind of entity.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// API request failed with a non-success status.
    #[error("Snyk API error ({status_code}): {body}")]
    ApiError { status_code: u16, body: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request body could not be serialized.
    #[error("Failed to serialize request body: {0}")]
    SerializeError(#[source] serde_json::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Neither known ignore response shape matched.
    #[error("Failed to parse ignore response body (by path: {by_path}; flat: {flat})")]
    IgnoreParseError {
        by_path: serde_json::Error,
        flat: serde_json::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl SnykError {
    /// HTTP status code, if this error came from a non-success response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for Snyk operations.
pub type Result<T> = core::result::Result<T, SnykError>;
