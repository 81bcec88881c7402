//! HTTP route handlers for the relay API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::relay::{Dispatch, RelayRequest};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "relay-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

/// Relay one chat turn upstream.
///
/// Success mirrors the upstream body; failures are `{"error": ..}` with the
/// upstream status, or 500 for relay faults. A body that does not decode as a
/// request is a relay fault too, so every reply on this route is JSON.
async fn chat(
    State(state): State<Arc<AppState>>,
    request: Result<Json<RelayRequest>, JsonRejection>,
) -> Dispatch {
    match request {
        Ok(Json(request)) => state.relay.dispatch(&request).await,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "Unreadable chat request: {}", rejection.body_text());
            Dispatch::Faulted
        }
    }
}
