//! Client for the hosted completion endpoint.
//!
//! Every call is a fresh single-turn exchange: the relayed message is the only
//! entry in `messages`, no earlier turns are attached.

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::config::RelayConfig;
use super::error::{RelayError, RelayResult};
use super::types::RelayRequest;

/// Header carrying the credential.
const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the API version.
const API_VERSION_HEADER: &str = "anthropic-version";

#[derive(Serialize)]
struct UpstreamMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: [UpstreamMessage<'a>; 1],
    max_tokens: u32,
}

/// Raw upstream reply: status plus parsed JSON body.
#[derive(Clone, Debug)]
pub struct UpstreamReply {
    /// HTTP status returned by the upstream.
    pub status: StatusCode,
    /// Parsed response body.
    pub body: Value,
}

/// Async client for the upstream messages endpoint.
pub struct AnthropicClient {
    client: reqwest::Client,
    config: RelayConfig,
}

impl AnthropicClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is malformed or the HTTP client
    /// cannot be built.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        config.upstream_endpoint()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RelayError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Send `request.message` upstream as a new single-turn exchange.
    ///
    /// # Errors
    /// Returns an error if the credential is not a valid header value, the
    /// request cannot be completed, or the body is not JSON.
    pub async fn create_message(&self, request: &RelayRequest) -> RelayResult<UpstreamReply> {
        let mut api_key = HeaderValue::from_str(request.credential.expose_secret())
            .map_err(|_| RelayError::InvalidCredential)?;
        api_key.set_sensitive(true);

        let payload = MessagesRequest {
            model: &request.model_id,
            messages: [UpstreamMessage {
                role: "user",
                content: &request.message,
            }],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.upstream_url)
            .header(API_KEY_HEADER, api_key)
            .header(API_VERSION_HEADER, &self.config.api_version)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        Ok(UpstreamReply { status, body })
    }
}
