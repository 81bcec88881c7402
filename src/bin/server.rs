//! Relay server binary.
//! Run with: cargo run --bin relay-chat-server

use std::process::ExitCode;

use relay_chat::start_relay_chat;

fn main() -> ExitCode {
    start_relay_chat::run()
}
