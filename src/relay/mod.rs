//! Completion relay: forwards one user turn to the upstream completion service
//! and normalizes whatever comes back.
//!
//! Every invocation resolves to a value. Upstream rejections, malformed bodies
//! and transport faults are all folded into [`Dispatch`] / [`RelayResponse`];
//! nothing propagates to the caller as an error.

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;
pub mod upstream;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use types::{RelayRequest, RelayResponse};
pub use upstream::{AnthropicClient, UpstreamReply};

use reqwest::StatusCode;
use serde_json::{Value, json};

use normalize::{INTERNAL_SERVER_ERROR, UNEXPECTED_FORMAT, extract_error_message, extract_text};

/// Returned when a request arrives without any message text.
pub const EMPTY_MESSAGE: &str = "Message must not be empty";

/// Wire-level outcome of one upstream exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// Upstream answered 2xx; the body is mirrored verbatim.
    Delivered(Value),
    /// Upstream answered non-2xx, or the request was refused locally.
    Rejected {
        /// Status to mirror back to the caller.
        status: StatusCode,
        /// Human-readable reason.
        message: String,
    },
    /// The exchange failed before a structured response was obtained.
    Faulted,
}

impl Dispatch {
    /// HTTP status of the relay's reply.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Delivered(_) => StatusCode::OK,
            Self::Rejected { status, .. } => *status,
            Self::Faulted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body of the relay's reply: upstream body on success, `{"error": ..}` otherwise.
    #[must_use]
    pub fn into_body(self) -> Value {
        match self {
            Self::Delivered(body) => body,
            Self::Rejected { message, .. } => json!({ "error": message }),
            Self::Faulted => json!({ "error": INTERNAL_SERVER_ERROR }),
        }
    }

    /// Normalize into the uniform relay outcome.
    #[must_use]
    pub fn into_relay_response(self) -> RelayResponse {
        match self {
            Self::Delivered(body) => {
                extract_text(&body).map_or_else(|| RelayResponse::err(UNEXPECTED_FORMAT), RelayResponse::ok)
            }
            Self::Rejected { message, .. } => RelayResponse::err(message),
            Self::Faulted => RelayResponse::err(INTERNAL_SERVER_ERROR),
        }
    }
}

/// Stateless relay in front of the upstream completion endpoint.
///
/// Holds no session state, so one instance can serve any number of concurrent
/// requests.
pub struct Relay {
    upstream: AnthropicClient,
}

impl Relay {
    /// Create a relay with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the upstream client cannot be created.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        Ok(Self {
            upstream: AnthropicClient::new(config)?,
        })
    }

    /// Create a relay pointing at the public upstream endpoint.
    ///
    /// # Errors
    /// Returns an error if the upstream client cannot be created.
    pub fn with_defaults() -> RelayResult<Self> {
        Self::new(RelayConfig::default())
    }

    /// Upstream endpoint this relay forwards to.
    #[must_use]
    pub fn upstream_url(&self) -> &str {
        &self.upstream.config().upstream_url
    }

    /// Perform one upstream exchange and classify its outcome.
    pub async fn dispatch(&self, request: &RelayRequest) -> Dispatch {
        if request.message.trim().is_empty() {
            tracing::debug!("Refusing relay request without message text");
            return Dispatch::Rejected {
                status: StatusCode::BAD_REQUEST,
                message: EMPTY_MESSAGE.to_string(),
            };
        }

        tracing::debug!(
            model = %request.model_id,
            chars = request.message.chars().count(),
            "Forwarding message upstream"
        );

        match self.upstream.create_message(request).await {
            Ok(reply) if reply.status.is_success() => Dispatch::Delivered(reply.body),
            Ok(reply) => {
                let message = extract_error_message(&reply.body);
                tracing::warn!(status = %reply.status, "Upstream rejected request: {message}");
                Dispatch::Rejected {
                    status: reply.status,
                    message,
                }
            }
            Err(e) => {
                tracing::error!(transport = e.is_transport(), "Relay fault: {e}");
                Dispatch::Faulted
            }
        }
    }

    /// Relay one turn and normalize the result.
    pub async fn forward(&self, request: &RelayRequest) -> RelayResponse {
        self.dispatch(request).await.into_relay_response()
    }
}
