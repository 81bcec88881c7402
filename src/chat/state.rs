//! Session-scoped conversation state.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use uuid::Uuid;

use crate::relay::RelayRequest;

use super::message::Message;
use super::model::ClaudeModel;

/// Identifier of one conversation session, used to tell sessions apart in logs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Everything one conversation owns: its log, credential, model and busy flag.
///
/// The log is append-only. Only the controller appends to it or toggles
/// `pending`; everyone else gets read access.
pub struct ConversationState {
    session_id: SessionId,
    history: Vec<Message>,
    credential: SecretString,
    model: ClaudeModel,
    pending: bool,
}

impl ConversationState {
    /// Start an empty, idle conversation on `model` with no credential.
    #[must_use]
    pub fn new(model: ClaudeModel) -> Self {
        Self {
            session_id: SessionId::new(),
            history: Vec::new(),
            credential: SecretString::new(String::new()),
            model,
            pending: false,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Turns in conversation order.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Replace the credential forwarded with subsequent requests.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = SecretString::new(credential.into());
    }

    /// Whether a non-empty credential has been supplied.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        !self.credential.expose_secret().is_empty()
    }

    /// Selected model.
    #[must_use]
    pub const fn model(&self) -> ClaudeModel {
        self.model
    }

    /// Select the model used by subsequent requests.
    pub fn set_model(&mut self, model: ClaudeModel) {
        self.model = model;
    }

    /// Whether a relay request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether the input surface should refuse new sends.
    #[must_use]
    pub fn is_input_disabled(&self) -> bool {
        !self.has_credential() || self.pending
    }

    /// Read-only projection consumed by the presentation layer.
    #[must_use]
    pub fn view(&self) -> ConversationView<'_> {
        ConversationView {
            messages: self
                .history
                .iter()
                .map(|message| ViewMessage {
                    content: &message.content,
                    is_user: message.is_user(),
                })
                .collect(),
            disabled: self.is_input_disabled(),
        }
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.history.push(message);
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub(crate) fn relay_request(&self, text: &str) -> RelayRequest {
        RelayRequest::new(text, self.credential.clone(), self.model.as_str())
    }
}

impl fmt::Debug for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationState")
            .field("session_id", &self.session_id)
            .field("turns", &self.history.len())
            .field("has_credential", &self.has_credential())
            .field("model", &self.model)
            .field("pending", &self.pending)
            .finish()
    }
}

/// A turn as the presentation layer sees it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMessage<'a> {
    /// Literal text.
    pub content: &'a str,
    /// Whether the user wrote it.
    pub is_user: bool,
}

/// Snapshot handed to the presentation layer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConversationView<'a> {
    /// Turns in order.
    pub messages: Vec<ViewMessage<'a>>,
    /// Whether the send affordance should be disabled.
    pub disabled: bool,
}
