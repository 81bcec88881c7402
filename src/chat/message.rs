//! Conversation turns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of assistant turns synthesized from a failed relay.
pub const ERROR_PREFIX: &str = "Error: ";

/// Author of a turn.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The person typing.
    User,
    /// The upstream model, or an error synthesized in its place.
    Assistant,
}

impl Author {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(value.to_string()),
        }
    }
}

/// One entry of the conversation log. Never mutated once appended.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Literal text body.
    pub content: String,
    /// Who produced the turn.
    pub author: Author,
    /// When the turn was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: Author::User,
            created_at: Utc::now(),
        }
    }

    /// Build an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: Author::Assistant,
            created_at: Utc::now(),
        }
    }

    /// Build the assistant turn reporting a failed relay.
    #[must_use]
    pub fn error(error_message: &str) -> Self {
        Self::assistant(format!("{ERROR_PREFIX}{error_message}"))
    }

    /// Whether the turn was typed by the user.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.author, Author::User)
    }
}
