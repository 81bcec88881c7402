//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::relay::{Relay, RelayConfig};

/// Shared application state.
pub struct AppState {
    /// Stateless relay to the upstream completion service.
    pub relay: Relay,
}

impl AppState {
    /// Create application state relaying to the public upstream endpoint.
    ///
    /// # Errors
    /// Returns an error if the relay's HTTP client cannot be created.
    pub fn new() -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_config(RelayConfig::default())
    }

    /// Create application state with a custom relay configuration.
    ///
    /// # Errors
    /// Returns an error if the relay's HTTP client cannot be created.
    pub fn with_config(config: RelayConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let relay = Relay::new(config).map_err(|e| format!("Failed to create relay: {e}"))?;
        Ok(Arc::new(Self { relay }))
    }
}
