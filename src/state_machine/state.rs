//! Ticket-intake context and lifecycle phase

use serde::{Deserialize, Serialize};

/// Position in the forward-only ticket-intake lifecycle.
///
/// The derived ordering is load-bearing: phases only ever move forward
/// through `Greeting < Collecting < Confirming < Complete`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Transient: set at creation, left behind on the first processed reply.
    #[default]
    Greeting,
    Collecting,
    Confirming,
    Complete,
}

/// Urgency slot values the assistant is instructed to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// The extracted ticket-intake slots plus lifecycle phase.
///
/// Exactly one authoritative copy exists per session; every mutation flows
/// through [`advance`](super::advance). Slot values are extracted by the
/// assistant model, not parsed server-side, so they stay unset here and live
/// only in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TicketContext {
    pub product: Option<String>,
    pub issue: Option<String>,
    pub urgency: Option<Urgency>,
    pub ticket_id: Option<String>,
    #[serde(rename = "state")]
    pub phase: Phase,
}
