//! Session data model
//!
//! These types are wire-shape authoritative: a `Session` serializes to the
//! exact JSON the realtime channel's `history` event carries.

use crate::state_machine::TicketContext;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Greeting installed as the first assistant turn of every new session.
pub const GREETING: &str =
    "Hi! I’m your support assistant. What product can I help you with today?";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a session transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Unix seconds. Informational only; ordering authority is append order.
    pub ts: i64,
}

impl Turn {
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            ts: Utc::now().timestamp(),
        }
    }
}

/// Per-session truth: transcript plus extracted context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    #[serde(rename = "messages")]
    pub turns: Vec<Turn>,
    pub context: TicketContext,
    /// Store-internal optimistic concurrency token; not part of the wire shape.
    #[serde(skip)]
    pub version: u64,
}

impl Session {
    /// A fresh session: greeting delivered, all slots unset.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            turns: vec![Turn::now(Role::Assistant, GREETING)],
            context: TicketContext::default(),
            version: 0,
        }
    }

    /// Append one processed exchange. Turns and context change together, as
    /// a unit, so no observer ever sees one without the other.
    pub fn record_exchange(&mut self, user: Turn, assistant: Turn, context: TicketContext) {
        self.turns.push(user);
        self.turns.push(assistant);
        self.context = context;
    }
}
