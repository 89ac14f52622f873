//! Phase-signal classification over assistant output
//!
//! Detection is a heuristic over free text, not a byte-exact protocol: the
//! canonical prompt templates produce these substrings, and matching is
//! case-insensitive so minor phrasing drift does not break the machine.

/// Substitution placeholder the assistant emits in its issuance utterance.
/// Matched case-sensitively; it is a literal token, not prose.
pub const TICKET_PLACEHOLDER: &str = "[TICKET_ID]";

const CONFIRM_PROPOSAL: &str = "creating a ticket for";
const CONFIRM_QUESTION: &str = "submit now?";
const ISSUANCE_MARKER: &str = "ticket #";

/// What one assistant reply signals about the intake lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSignal {
    /// A clarifying question or other progress; no transition implied
    Progress,
    /// The assistant summarized the ticket and asked to submit
    ConfirmProposed,
    /// The assistant announced a submitted ticket, placeholder pending
    TicketIssuance,
}

/// Classifies assistant text into a phase signal.
///
/// Behind a trait so the matching rules can evolve, or be replaced by a
/// structured-output contract from the model, without touching the machine.
pub trait PhaseClassifier: Send + Sync {
    fn classify(&self, text: &str) -> PhaseSignal;
}

/// Default classifier: substring heuristics matched to the canonical prompt
/// templates in [`crate::prompt`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseClassifier;

impl PhaseClassifier for PhraseClassifier {
    fn classify(&self, text: &str) -> PhaseSignal {
        let lower = text.to_lowercase();
        if text.contains(TICKET_PLACEHOLDER) && lower.contains(ISSUANCE_MARKER) {
            PhaseSignal::TicketIssuance
        } else if lower.contains(CONFIRM_PROPOSAL) && lower.contains(CONFIRM_QUESTION) {
            PhaseSignal::ConfirmProposed
        } else {
            PhaseSignal::Progress
        }
    }
}
