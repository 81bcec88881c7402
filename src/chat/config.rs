//! Startup configuration for conversation clients.

use super::model::ClaudeModel;

/// Environment variable selecting the initial model.
pub const MODEL_ENV: &str = "RELAY_CHAT_MODEL";

/// Client configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct ChatConfig {
    /// Model selected for new conversations.
    pub default_model: ClaudeModel,
}

impl ChatConfig {
    /// Resolve configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`.
    ///
    /// An unknown model identifier is logged and ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_model = match lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {MODEL_ENV}: {e}");
                ClaudeModel::default()
            }),
            None => ClaudeModel::default(),
        };

        Self { default_model }
    }
}
