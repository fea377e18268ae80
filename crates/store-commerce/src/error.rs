//! Search error types.

use thiserror::Error;

/// Errors surfaced by a search request.
///
/// None of these are fatal: the controller records them as a retryable
/// failure flag on the result set that issued the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The request could not be sent or the connection dropped.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Transport(_) | SearchError::Timeout => true,
            SearchError::Http { status, .. } => *status >= 500 || *status == 429,
            SearchError::Decode(_) => false,
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::Decode(e.to_string())
    }
}
