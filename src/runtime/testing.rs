//! Mock implementations for runtime tests
//!
//! These enable driving a real worker without network I/O.

use crate::llm::{AssistantGateway, GatewayError};
use crate::session::{Session, Turn};
use crate::state_machine::TicketContext;
use crate::store::{MemoryStore, SessionStore, StoreError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Gateway returning queued replies, optionally after a delay.
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    delay: Option<Duration>,
    /// Record of every user input seen
    pub requests: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, error: GatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Inputs seen so far, in arrival order.
    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantGateway for MockGateway {
    async fn generate(
        &self,
        _history: &[Turn],
        _context: &TicketContext,
        user_input: &str,
    ) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(user_input.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::unavailable("No mock reply queued")))
    }
}

// ============================================================================
// Conflicting Store
// ============================================================================

/// Store wrapper that rejects the first commit with a conflict, then
/// delegates. Exercises the coordinator's retry-against-latest path.
pub struct ConflictOnce {
    inner: MemoryStore,
    tripped: AtomicBool,
}

impl ConflictOnce {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SessionStore for ConflictOnce {
    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.inner.get(session_id).await
    }

    async fn create_if_absent(&self, session_id: &str) -> Session {
        self.inner.create_if_absent(session_id).await
    }

    async fn commit(&self, session: Session) -> Result<(), StoreError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Conflict(session.session_id));
        }
        self.inner.commit(session).await
    }

    async fn evict(&self, session_id: &str) {
        self.inner.evict(session_id).await;
    }
}
