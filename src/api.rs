//! HTTP and WebSocket surface

mod handlers;
mod types;
mod ws;

pub use handlers::create_router;
pub use types::{ClientMessage, CreateSessionResponse, ServerEvent, TurnFailure, TurnReply};

use crate::runtime::ProductionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ProductionManager>,
}

impl AppState {
    pub fn new(sessions: Arc<ProductionManager>) -> Self {
        Self { sessions }
    }
}
