//! Session worker: one task, one session, strict turn order

use super::{OutboundEvent, RuntimeConfig};
use crate::llm::{AssistantGateway, GatewayError};
use crate::session::{Role, Session, Turn};
use crate::state_machine::{advance, PhraseClassifier, TicketContext, TicketMinter};
use crate::store::{SessionStore, StoreError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Status line pushed while a turn is in flight.
pub const THINKING_STATUS: &str = "Assistant is thinking...";

/// Processes one session's messages strictly in receipt order.
///
/// Cancellation policy: the worker is decoupled from any one socket, so a
/// client disconnect never interrupts a turn. In-flight turns complete and
/// commit; only delivery to the vanished socket is discarded.
pub struct SessionWorker<S, G> {
    session_id: String,
    store: Arc<S>,
    gateway: Arc<G>,
    tickets: Arc<TicketMinter>,
    classifier: PhraseClassifier,
    config: RuntimeConfig,
    message_rx: mpsc::Receiver<String>,
    events_tx: broadcast::Sender<OutboundEvent>,
}

impl<S, G> SessionWorker<S, G>
where
    S: SessionStore,
    G: AssistantGateway,
{
    pub fn new(
        session_id: String,
        store: Arc<S>,
        gateway: Arc<G>,
        tickets: Arc<TicketMinter>,
        config: RuntimeConfig,
        message_rx: mpsc::Receiver<String>,
        events_tx: broadcast::Sender<OutboundEvent>,
    ) -> Self {
        Self {
            session_id,
            store,
            gateway,
            tickets,
            classifier: PhraseClassifier,
            config,
            message_rx,
            events_tx,
        }
    }

    /// Runs until the inbox closes or the idle TTL expires. A new message
    /// does not start processing until the prior turn fully committed or
    /// failed.
    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Session worker started");

        loop {
            let message = tokio::select! {
                message = self.message_rx.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
                () = tokio::time::sleep(self.config.session_ttl) => {
                    // Reap only unwatched sessions: a silent client with an
                    // open socket keeps its session alive.
                    if self.events_tx.receiver_count() == 0 {
                        tracing::info!(session_id = %self.session_id, "Idle TTL reached");
                        break;
                    }
                    continue;
                }
            };

            self.process_turn(&message).await;
        }

        tracing::info!(session_id = %self.session_id, "Session worker stopped");
    }

    async fn process_turn(&self, user_input: &str) {
        let started = Instant::now();
        let _ = self.events_tx.send(OutboundEvent::Status {
            message: THINKING_STATUS.to_string(),
        });

        // Unknown ids are created fresh rather than rejected.
        let session = self.store.create_if_absent(&self.session_id).await;

        let generated = tokio::time::timeout(
            self.config.gateway_deadline,
            self.gateway
                .generate(&session.turns, &session.context, user_input),
        )
        .await;

        let raw_reply = match generated {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return self.report_failure(&err),
            Err(_) => {
                return self.report_failure(&GatewayError::timeout(format!(
                    "No upstream reply within {}s",
                    self.config.gateway_deadline.as_secs()
                )))
            }
        };

        let advanced = advance(&session.context, &raw_reply, &self.classifier, &self.tickets);
        let user_turn = Turn::now(Role::User, user_input);
        let assistant_turn = Turn::now(Role::Assistant, advanced.reply.clone());

        if let Err(err) = self
            .commit_exchange(session, user_turn, assistant_turn, advanced.context.clone())
            .await
        {
            tracing::error!(session_id = %self.session_id, error = %err, "Failed to commit turn");
            let _ = self.events_tx.send(OutboundEvent::Error {
                error: format!("Failed to record the turn: {err}"),
                retry_after_ms: millis(self.config.default_retry_hint),
            });
            return;
        }

        let _ = self.events_tx.send(OutboundEvent::Message {
            reply: advanced.reply,
            context: advanced.context,
            latency_ms: elapsed_ms(started),
        });
    }

    /// Commit with bounded conflict retries. The advance decision is reused
    /// as-is on retry, so a minted ticket is never minted twice for the same
    /// logical turn.
    async fn commit_exchange(
        &self,
        base: Session,
        user_turn: Turn,
        assistant_turn: Turn,
        context: TicketContext,
    ) -> Result<(), StoreError> {
        let mut base = base;
        let mut attempts = 0;
        loop {
            attempts += 1;

            let mut next = base.clone();
            next.record_exchange(user_turn.clone(), assistant_turn.clone(), context.clone());

            match self.store.commit(next).await {
                Ok(()) => return Ok(()),
                Err(StoreError::Conflict(_)) if attempts < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        attempts,
                        "Commit conflict, retrying against latest state"
                    );
                    base = self.store.create_if_absent(&self.session_id).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// A failed gateway call leaves the session exactly as it was: no turn
    /// is recorded, no context changes, the client may simply resend.
    fn report_failure(&self, err: &GatewayError) {
        tracing::warn!(
            session_id = %self.session_id,
            kind = ?err.kind,
            error = %err,
            "Gateway failure, session left unchanged"
        );
        let retry_after = err.retry_after.unwrap_or(self.config.default_retry_hint);
        let _ = self.events_tx.send(OutboundEvent::Error {
            error: format!("Upstream LLM error: {}", err.message),
            retry_after_ms: millis(retry_after),
        });
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
