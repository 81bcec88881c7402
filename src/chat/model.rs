//! Upstream model variants selectable by a conversation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Known upstream model variants.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ClaudeModel {
    /// Claude 3 Opus.
    #[serde(rename = "claude-3-opus-20240229")]
    Opus3,
    /// Claude 3 Sonnet.
    #[default]
    #[serde(rename = "claude-3-sonnet-20240229")]
    Sonnet3,
    /// Claude 3 Haiku.
    #[serde(rename = "claude-3-haiku-20240307")]
    Haiku3,
}

impl ClaudeModel {
    /// Every selectable model, in menu order.
    pub const ALL: [Self; 3] = [Self::Opus3, Self::Sonnet3, Self::Haiku3];

    /// Identifier sent upstream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opus3 => "claude-3-opus-20240229",
            Self::Sonnet3 => "claude-3-sonnet-20240229",
            Self::Haiku3 => "claude-3-haiku-20240307",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Opus3 => "Claude 3 Opus",
            Self::Sonnet3 => "Claude 3 Sonnet",
            Self::Haiku3 => "Claude 3 Haiku",
        }
    }
}

impl fmt::Display for ClaudeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown model identifier.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ClaudeModel {
    type Err = UnknownModel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == value.trim())
            .ok_or_else(|| UnknownModel(value.to_string()))
    }
}
