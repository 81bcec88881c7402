//! Configuration for the completion relay.

use std::time::Duration;

use url::Url;

use super::error::RelayResult;

/// Messages endpoint of the hosted completion service.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value sent with every upstream call.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Token budget requested for each completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Configuration for the relay's upstream client.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Upstream messages endpoint.
    pub upstream_url: String,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    /// `max_tokens` sent with each request.
    pub max_tokens: u32,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl RelayConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the relay at a different upstream endpoint.
    #[must_use]
    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    /// Parse the configured upstream endpoint.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed.
    pub fn upstream_endpoint(&self) -> RelayResult<Url> {
        Ok(Url::parse(&self.upstream_url)?)
    }
}
