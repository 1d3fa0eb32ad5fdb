//! LocalLens error types

use std::time::Duration;

/// LocalLens error types
#[derive(Debug, thiserror::Error)]
pub enum LensError {
    // Caller errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Provider/network errors
    #[error("request timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("API request failed ({status}): {body}")]
    Api {
        status: u16,
        body: serde_json::Value,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    // Persistence errors
    #[error("key-value store unavailable: {0}")]
    StoreUnavailable(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LensError {
    /// HTTP status carried by an [`LensError::Api`] error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LensError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a failed attempt may be retried.
    ///
    /// Retryable: request timeouts and API responses with status 401, 408,
    /// 429 or any 5xx. Everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            LensError::Timeout { .. } => true,
            LensError::Api { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Status codes that make a response eligible for another attempt.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 401 | 408 | 429) || status >= 500
}

impl From<reqwest::Error> for LensError {
    fn from(err: reqwest::Error) -> Self {
        LensError::Http(err.to_string())
    }
}

/// Result type alias for LocalLens operations
pub type Result<T> = std::result::Result<T, LensError>;
