//! Error types for the completion relay.

use thiserror::Error;

/// Errors that can occur while exchanging a message with the upstream service.
///
/// These never leave the relay: [`crate::relay::Relay::dispatch`] folds every
/// variant into a [`crate::relay::Dispatch::Faulted`] outcome.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request to the upstream service failed.
    #[error("upstream request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Upstream body was not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Credential could not be encoded as a header value.
    #[error("credential is not a valid header value")]
    InvalidCredential,

    /// Invalid upstream URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl RelayError {
    /// Check if this error happened before the upstream produced a response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::HttpRequest(_))
    }
}

/// Convenience result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
