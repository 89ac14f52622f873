//! Turn-advance logic

use super::signal::{PhaseClassifier, PhaseSignal, TICKET_PLACEHOLDER};
use super::state::{Phase, TicketContext};
use super::ticket::TicketMinter;

/// Outcome of advancing the machine over one assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advanced {
    pub context: TicketContext,
    /// The reply to record and deliver; equals the raw text except when a
    /// ticket placeholder was substituted.
    pub reply: String,
}

/// Advance the conversation over one assistant reply.
///
/// Pure apart from minting: the transition decision for a given
/// (context, text) pair is always the same, and the minter is only consulted
/// when that decision is a ticket issuance. The phase moves forward only.
/// Slot values are never inspected or written here; extracting them is the
/// assistant model's job.
pub fn advance(
    context: &TicketContext,
    raw_reply: &str,
    classifier: &dyn PhaseClassifier,
    tickets: &TicketMinter,
) -> Advanced {
    let mut next = context.clone();

    // The greeting itself is delivered at session creation, so the first
    // processed reply moves the machine into collection whatever it says.
    if next.phase == Phase::Greeting {
        next.phase = Phase::Collecting;
    }

    match classifier.classify(raw_reply) {
        PhaseSignal::ConfirmProposed if next.phase <= Phase::Collecting => {
            next.phase = Phase::Confirming;
            Advanced {
                context: next,
                reply: raw_reply.to_string(),
            }
        }
        PhaseSignal::TicketIssuance if next.phase < Phase::Complete => {
            let ticket_id = tickets.mint();
            let reply = raw_reply.replace(TICKET_PLACEHOLDER, &ticket_id);
            next.phase = Phase::Complete;
            next.ticket_id = Some(ticket_id);
            Advanced {
                context: next,
                reply,
            }
        }
        _ => Advanced {
            context: next,
            reply: raw_reply.to_string(),
        },
    }
}
