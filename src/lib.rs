//! Chat relay for a hosted completion service: a stateless HTTP relay plus the
//! conversation controller that drives it, one turn at a time.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(non_camel_case_types)]
#![deny(unused_must_use)]
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::cognitive_complexity)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![deny(overflowing_literals)]

/// Conversation state and the controller that relays user turns.
pub mod chat;
/// Completion relay: upstream client and response normalization.
pub mod relay;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers for the server and terminal binaries.
pub mod start_relay_chat;
/// Terminal front end for one conversation.
pub mod terminal;
