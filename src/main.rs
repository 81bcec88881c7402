//! Terminal chat client.
//! Run with: cargo run --bin relay-chat

use std::process::ExitCode;

use relay_chat::chat::ChatConfig;
use relay_chat::{start_relay_chat, terminal};

fn main() -> ExitCode {
    start_relay_chat::init_logging();

    let config = ChatConfig::from_env();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(terminal::run_terminal(config)) {
        tracing::error!("Chat client error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
