//! HTTP request handlers

use super::types::CreateSessionResponse;
use super::ws::ws_handler;
use super::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session creation
        .route("/api/chat/session", post(create_session))
        // Realtime channel
        .route("/ws/:session_id", get(ws_handler))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

/// Mint a session identifier. The session record itself is installed on
/// first connect, so an unused identifier costs nothing.
async fn create_session() -> Json<CreateSessionResponse> {
    Json(CreateSessionResponse {
        session_id: uuid::Uuid::new_v4().to_string(),
    })
}

async fn get_version() -> &'static str {
    concat!("intake ", env!("CARGO_PKG_VERSION"))
}
