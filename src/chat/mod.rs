//! Conversation side of the relay: per-session state and the controller
//! that turns user input into relay round-trips.

pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod model;
pub mod state;
pub mod transport;

pub use config::ChatConfig;
pub use controller::{ConversationController, OpenTurn, SendOutcome};
pub use error::TransportError;
pub use message::{Author, Message};
pub use model::ClaudeModel;
pub use state::{ConversationState, ConversationView, SessionId};
pub use transport::{HttpRelayTransport, RelayTransport};
