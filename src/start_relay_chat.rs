//! Startup helpers for the relay server and the terminal client.

use std::process::ExitCode;
use std::sync::Arc;

use crate::server::{self, AppState};

/// Environment variable overriding the server port.
pub const PORT_ENV: &str = "RELAY_CHAT_PORT";

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Output goes to stderr so it never
/// interleaves with a transcript on stdout.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the relay server (used by the `relay-chat-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_logging();

    tracing::info!("Starting relay-chat server v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };

    let port = get_port();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if state creation fails.
pub fn initialize() -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    AppState::new().map_err(|e| format!("Failed to create state: {e}").into())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl+C handler failed: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

/// Get configured server port.
#[must_use]
pub fn get_port() -> u16 {
    parse_port(std::env::var(PORT_ENV).ok().as_deref())
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}
