//! Assistant gateway abstraction
//!
//! Wraps the external language-model call behind a deterministic interface
//! with a normalized error taxonomy. The model is an opaque collaborator:
//! transcript and context in, one utterance or a typed failure out.

mod error;
mod openai;

pub use error::{GatewayError, GatewayErrorKind};
pub use openai::{GatewayConfig, OpenAiGateway};

use crate::session::Turn;
use crate::state_machine::TicketContext;
use async_trait::async_trait;
use std::sync::Arc;

/// Boundary to the external language-model service.
///
/// No retry logic lives here; retries are a coordinator policy decision.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Produce the next assistant utterance for one turn.
    ///
    /// The model is stateless across calls, so the full transcript and a
    /// deterministic serialization of `context` are supplied every time.
    async fn generate(
        &self,
        history: &[Turn],
        context: &TicketContext,
        user_input: &str,
    ) -> Result<String, GatewayError>;
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn AssistantGateway>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn AssistantGateway>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AssistantGateway for LoggingGateway {
    async fn generate(
        &self,
        history: &[Turn],
        context: &TicketContext,
        user_input: &str,
    ) -> Result<String, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(history, context, user_input).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    history_turns = history.len(),
                    reply_chars = reply.len(),
                    "Gateway call completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Gateway call failed"
                );
            }
        }

        result
    }
}
