//! Core conversation state machine
//!
//! Pure logic mapping (context, assistant output) to (next context,
//! normalized reply). No I/O happens here; the coordinator owns persistence
//! and delivery.

mod advance;
pub mod signal;
mod state;
mod ticket;

#[cfg(test)]
mod proptests;

pub use advance::{advance, Advanced};
pub use signal::{PhaseClassifier, PhaseSignal, PhraseClassifier};
pub use state::{Phase, TicketContext, Urgency};
pub use ticket::TicketMinter;
