//! Conversational ticket-intake service
//!
//! Clients open a WebSocket per session, chat with an LLM-backed intake
//! assistant, and the server tracks per-session state until a structured
//! support ticket is issued.

mod api;
mod llm;
mod prompt;
mod runtime;
mod session;
mod state_machine;
mod store;

use api::{create_router, AppState};
use llm::{GatewayConfig, LoggingGateway, OpenAiGateway};
use runtime::{RuntimeConfig, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use store::MemoryStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("INTAKE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let gateway_config = GatewayConfig::from_env();
    if gateway_config.has_credentials() {
        tracing::info!(model = %gateway_config.model, "Assistant gateway configured");
    } else {
        tracing::warn!("No upstream API key configured. Set OPENAI_API_KEY.");
    }

    let gateway = LoggingGateway::new(Arc::new(OpenAiGateway::new(gateway_config)));
    let manager = SessionManager::new(
        Arc::new(MemoryStore::new()),
        Arc::new(gateway),
        RuntimeConfig::from_env(),
    );
    let state = AppState::new(Arc::new(manager));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Ticket intake server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
