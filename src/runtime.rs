//! Per-session turn orchestration
//!
//! One worker task per session serializes that session's turns: a new
//! message for a session does not start processing until the prior turn has
//! fully committed or failed. Across sessions, processing is fully parallel.

mod worker;

#[cfg(test)]
pub mod testing;

pub use worker::SessionWorker;

use crate::llm::{AssistantGateway, LoggingGateway};
use crate::state_machine::{TicketContext, TicketMinter};
use crate::store::{MemoryStore, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Production manager with concrete store and gateway implementations
pub type ProductionManager = SessionManager<MemoryStore, LoggingGateway>;

/// Events fanned out to every socket attached to a session
#[derive(Debug, Clone)]
pub enum OutboundEvent {
    /// Transient progress notice; advisory only, no state implication
    Status { message: String },
    /// Result of a successfully processed turn
    Message {
        reply: String,
        context: TicketContext,
        latency_ms: u64,
    },
    /// A failed turn; the session is unchanged and the client may resend
    Error { error: String, retry_after_ms: u64 },
}

/// Tunables for turn processing
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Deadline imposed on each gateway call; expiry is an upstream timeout.
    pub gateway_deadline: Duration,
    /// Retry hint sent to clients when a failure carries none of its own.
    pub default_retry_hint: Duration,
    /// Idle time after which a session's worker stops and the session is
    /// evicted from the store.
    pub session_ttl: Duration,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gateway_deadline: env_secs("INTAKE_GATEWAY_TIMEOUT_SECS")
                .unwrap_or(defaults.gateway_deadline),
            default_retry_hint: std::env::var("INTAKE_RETRY_HINT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_retry_hint),
            session_ttl: env_secs("INTAKE_SESSION_TTL_SECS").unwrap_or(defaults.session_ttl),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gateway_deadline: Duration::from_secs(60),
            default_retry_hint: Duration::from_millis(1000),
            session_ttl: Duration::from_secs(3600),
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

/// Handle to a running session worker
struct SessionHandle {
    message_tx: mpsc::Sender<String>,
    events_tx: broadcast::Sender<OutboundEvent>,
}

/// Manager owning one worker per active session.
///
/// Workers are spawned lazily on first traffic and reaped after the idle
/// TTL; a reaped session's store entry is evicted with it, so a later
/// reconnect starts fresh.
pub struct SessionManager<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    tickets: Arc<TicketMinter>,
    config: RuntimeConfig,
    workers: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl<S, G> SessionManager<S, G>
where
    S: SessionStore + 'static,
    G: AssistantGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>, config: RuntimeConfig) -> Self {
        Self {
            store,
            gateway,
            tickets: Arc::new(TicketMinter::new()),
            config,
            workers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Queue one inbound message for a session, spawning its worker if
    /// needed. Delivery into the per-session queue preserves receipt order.
    pub async fn send_message(&self, session_id: &str, mut text: String) {
        for _ in 0..2 {
            let message_tx = self.ensure_worker(session_id).await.message_tx;
            match message_tx.send(text).await {
                Ok(()) => return,
                // The worker raced us to idle shutdown; drop the stale
                // handle and spawn a fresh one.
                Err(mpsc::error::SendError(returned)) => {
                    text = returned;
                    self.workers.write().await.remove(session_id);
                }
            }
        }
        tracing::error!(session_id = %session_id, "Dropped message: worker unavailable");
    }

    /// Subscribe to a session's outbound events.
    pub async fn subscribe(&self, session_id: &str) -> broadcast::Receiver<OutboundEvent> {
        self.ensure_worker(session_id).await.events_tx.subscribe()
    }

    /// The underlying session store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn ensure_worker(&self, session_id: &str) -> SessionHandle {
        {
            let workers = self.workers.read().await;
            if let Some(handle) = workers.get(session_id) {
                return SessionHandle {
                    message_tx: handle.message_tx.clone(),
                    events_tx: handle.events_tx.clone(),
                };
            }
        }

        let mut workers = self.workers.write().await;
        // Double-check: another caller may have won the write lock first.
        if let Some(handle) = workers.get(session_id) {
            return SessionHandle {
                message_tx: handle.message_tx.clone(),
                events_tx: handle.events_tx.clone(),
            };
        }

        let (message_tx, message_rx) = mpsc::channel(32);
        let (events_tx, _) = broadcast::channel(128);

        let worker = SessionWorker::new(
            session_id.to_string(),
            Arc::clone(&self.store),
            Arc::clone(&self.gateway),
            Arc::clone(&self.tickets),
            self.config.clone(),
            message_rx,
            events_tx.clone(),
        );

        let reap_workers = Arc::clone(&self.workers);
        let reap_store = Arc::clone(&self.store);
        let reap_id = session_id.to_string();
        let reap_tx = message_tx.clone();
        tokio::spawn(async move {
            worker.run().await;
            // Only reap our own registration: a replacement worker may have
            // been spawned for this id while we were shutting down.
            let mut workers = reap_workers.write().await;
            let ours = workers
                .get(&reap_id)
                .is_some_and(|handle| handle.message_tx.same_channel(&reap_tx));
            if ours {
                workers.remove(&reap_id);
                drop(workers);
                reap_store.evict(&reap_id).await;
                tracing::info!(session_id = %reap_id, "Session worker stopped, session evicted");
            }
        });

        workers.insert(
            session_id.to_string(),
            SessionHandle {
                message_tx: message_tx.clone(),
                events_tx: events_tx.clone(),
            },
        );

        SessionHandle {
            message_tx,
            events_tx,
        }
    }
}
