//! Conversation controller: one relay round-trip per user turn.
//!
//! A conversation is either idle or awaiting a reply. `send` moves it to
//! awaiting, appends the user turn, calls the relay, appends exactly one
//! resulting turn and returns it to idle. Success, upstream failure and
//! transport failure all take the same path back; only the appended turn differs.

use std::sync::Arc;

use crate::relay::{RelayRequest, RelayResponse};

use super::error::TransportError;
use super::message::Message;
use super::state::ConversationState;
use super::transport::RelayTransport;

/// Reported when the relay call itself could not be completed.
pub const TRANSPORT_FAILURE: &str = "Failed to process your request";

/// What a call to [`ConversationController::send`] did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// A request was already in flight; nothing was appended.
    Busy,
    /// The turn completed and this message was appended.
    Settled(Message),
}

/// A turn opened by [`ConversationController::begin`] and not yet settled.
///
/// Borrows the conversation it was opened on for its whole life, so the reply
/// can only land there. Dropping it unsettled returns the conversation to idle;
/// the user turn stays and no reply is appended.
#[derive(Debug)]
pub struct OpenTurn<'a> {
    state: &'a mut ConversationState,
    request: RelayRequest,
}

impl OpenTurn<'_> {
    /// The conversation this turn belongs to.
    #[must_use]
    pub fn state(&self) -> &ConversationState {
        self.state
    }

    /// The request to relay.
    #[must_use]
    pub const fn request(&self) -> &RelayRequest {
        &self.request
    }

    /// Close the turn with the relay's outcome and return the appended message.
    pub fn settle(mut self, result: Result<RelayResponse, TransportError>) -> Message {
        let session = self.state.session_id();
        let message = match result {
            Ok(RelayResponse::Ok { text }) => Message::assistant(text),
            Ok(RelayResponse::Err { error_message }) => {
                tracing::info!(%session, "Relay reported failure: {error_message}");
                Message::error(&error_message)
            }
            Err(e) => {
                tracing::warn!(%session, "Relay call failed: {e}");
                Message::error(TRANSPORT_FAILURE)
            }
        };

        self.state.append(message.clone());
        message
    }
}

impl Drop for OpenTurn<'_> {
    fn drop(&mut self) {
        self.state.set_pending(false);
    }
}

/// Drives request/response cycles for any number of conversations.
///
/// The controller holds no conversation data itself; each call receives the
/// session's [`ConversationState`].
#[derive(Clone)]
pub struct ConversationController {
    transport: Arc<dyn RelayTransport>,
}

impl ConversationController {
    /// Create a controller that reaches the relay through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self { transport }
    }

    /// Relay one user turn and fold the outcome into `state`.
    pub async fn send(&self, state: &mut ConversationState, text: &str) -> SendOutcome {
        match Self::begin(state, text) {
            Ok(turn) => self.complete(turn).await,
            Err(outcome) => outcome,
        }
    }

    /// Relay a turn opened by [`Self::begin`] and settle it.
    pub async fn complete(&self, turn: OpenTurn<'_>) -> SendOutcome {
        let result = self.transport.relay(&turn.request).await;
        SendOutcome::Settled(turn.settle(result))
    }

    /// Open a turn: mark the conversation pending and append the user message.
    ///
    /// # Errors
    /// Returns [`SendOutcome::Ignored`] for blank text and [`SendOutcome::Busy`]
    /// while another request is in flight.
    pub fn begin<'a>(state: &'a mut ConversationState, text: &str) -> Result<OpenTurn<'a>, SendOutcome> {
        if text.trim().is_empty() {
            return Err(SendOutcome::Ignored);
        }
        if state.is_pending() {
            tracing::warn!(session = %state.session_id(), "Rejected send while a request is in flight");
            return Err(SendOutcome::Busy);
        }

        state.set_pending(true);
        state.append(Message::user(text));
        tracing::debug!(
            session = %state.session_id(),
            model = %state.model(),
            turns = state.history().len(),
            "Relaying user turn"
        );

        let request = state.relay_request(text);
        Ok(OpenTurn { state, request })
    }
}
