//! HTTP client error types.

use store_commerce::SearchError;
use thiserror::Error;

/// Errors that can occur when making HTTP requests.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else if e.is_decode() {
            FetchError::ParseError(e.to_string())
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}

impl From<FetchError> for SearchError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::RequestError(msg) | FetchError::InvalidUrl(msg) => {
                SearchError::Transport(msg)
            }
            FetchError::HttpError { status, message } => SearchError::Http { status, message },
            FetchError::ParseError(msg) | FetchError::JsonError(msg) => SearchError::Decode(msg),
            FetchError::Timeout => SearchError::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_maps_to_search_error() {
        let http: SearchError = FetchError::HttpError {
            status: 503,
            message: "busy".into(),
        }
        .into();
        assert!(http.is_retryable());

        let decode: SearchError = FetchError::ParseError("eof".into()).into();
        assert_eq!(decode, SearchError::Decode("eof".into()));
        assert!(!decode.is_retryable());

        assert_eq!(SearchError::from(FetchError::Timeout), SearchError::Timeout);
    }
}
