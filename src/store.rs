//! Session store
//!
//! Lifecycle and concurrency authority for session data. The trait is the
//! narrow seam that lets a persistent or distributed backend replace the
//! in-memory map without touching the coordinator.

use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Store failures surfaced to the coordinator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("session {0} was modified concurrently")]
    Conflict(String),
}

/// Keyed session storage; no cross-session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of the current committed session.
    async fn get(&self, session_id: &str) -> Result<Session, StoreError>;

    /// Install the initial session if absent. Idempotent: an existing
    /// session is returned unchanged.
    async fn create_if_absent(&self, session_id: &str) -> Session;

    /// Version-checked commit. Once this returns `Ok`, no earlier version of
    /// the session is visible to any subsequent `get`. A stale base version
    /// is rejected with [`StoreError::Conflict`], never silently overwritten.
    async fn commit(&self, session: Session) -> Result<(), StoreError>;

    /// Remove a session. Eviction-policy hook; a no-op when absent.
    async fn evict(&self, session_id: &str);
}

/// In-memory store.
///
/// `get` clones the whole entry under the read lock and `commit` swaps it
/// under the write lock, so a reader never observes a half-updated
/// turn-list/context pair.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    async fn create_if_absent(&self, session_id: &str) -> Session {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id))
            .clone()
    }

    async fn commit(&self, mut session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&session.session_id) {
            None => Err(StoreError::NotFound(session.session_id.clone())),
            Some(stored) if stored.version != session.version => {
                Err(StoreError::Conflict(session.session_id.clone()))
            }
            Some(_) => {
                session.version += 1;
                sessions.insert(session.session_id.clone(), session);
                Ok(())
            }
        }
    }

    async fn evict(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
