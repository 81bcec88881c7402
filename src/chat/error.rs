//! Error types for the conversation side of the relay.

use thiserror::Error;

/// Failure to complete a relay call at all.
///
/// The controller never surfaces these to its caller; they become a generic
/// error turn in the transcript.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request to the relay failed.
    #[error("relay request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Relay body was not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
