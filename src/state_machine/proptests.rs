//! Property-based tests for the state machine
//!
//! These verify the lifecycle invariants hold across arbitrary assistant
//! output, not just the canonical templates.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Assistant replies: arbitrary prose mixed with the canonical templates, so
/// sequences exercise every transition.
fn arb_reply() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 ?.!#,]{0,80}",
        1 => Just(
            "I'm creating a ticket for Model X about jamming with high priority. Submit now?"
                .to_string()
        ),
        1 => Just("Ticket #[TICKET_ID] submitted. We'll follow up shortly.".to_string()),
        1 => Just("To confirm, is that low, medium, or high urgency?".to_string()),
    ]
}

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Greeting),
        Just(Phase::Collecting),
        Just(Phase::Confirming),
        Just(Phase::Complete),
    ]
}

fn arb_context() -> impl Strategy<Value = TicketContext> {
    arb_phase().prop_map(|phase| TicketContext {
        ticket_id: (phase == Phase::Complete).then(|| "T-9999".to_string()),
        phase,
        ..TicketContext::default()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The phase never transitions backward, whatever the replies say.
    #[test]
    fn phase_never_regresses(replies in proptest::collection::vec(arb_reply(), 0..12)) {
        let tickets = TicketMinter::seeded(1000);
        let mut context = TicketContext::default();

        for reply in replies {
            let prev = context.phase;
            context = advance(&context, &reply, &PhraseClassifier, &tickets).context;
            prop_assert!(context.phase >= prev);
        }
    }

    /// A ticket id is present exactly when the phase is complete.
    #[test]
    fn ticket_id_iff_complete(replies in proptest::collection::vec(arb_reply(), 0..12)) {
        let tickets = TicketMinter::seeded(1000);
        let mut context = TicketContext::default();

        for reply in replies {
            context = advance(&context, &reply, &PhraseClassifier, &tickets).context;
            prop_assert_eq!(
                context.ticket_id.is_some(),
                context.phase == Phase::Complete
            );
        }
    }

    /// The transition decision is a function of (context, text): advancing
    /// twice over the same pair yields the same phase and the same
    /// issuance decision.
    #[test]
    fn same_pair_same_decision(context in arb_context(), reply in arb_reply()) {
        let a = advance(&context, &reply, &PhraseClassifier, &TicketMinter::seeded(1000));
        let b = advance(&context, &reply, &PhraseClassifier, &TicketMinter::seeded(1000));

        prop_assert_eq!(a.context.phase, b.context.phase);
        prop_assert_eq!(a.context.ticket_id.is_some(), b.context.ticket_id.is_some());
        prop_assert_eq!(a.reply, b.reply);
    }

    /// Slot values are never touched by the machine.
    #[test]
    fn slots_are_never_written(reply in arb_reply()) {
        let tickets = TicketMinter::seeded(1000);
        let advanced = advance(&TicketContext::default(), &reply, &PhraseClassifier, &tickets);

        prop_assert!(advanced.context.product.is_none());
        prop_assert!(advanced.context.issue.is_none());
        prop_assert!(advanced.context.urgency.is_none());
    }

    /// A minted id always lands in the reply: no `[TICKET_ID]` placeholder
    /// survives a completed issuance.
    #[test]
    fn issuance_substitutes_placeholder(context in arb_context()) {
        let tickets = TicketMinter::seeded(1000);
        let advanced = advance(
            &context,
            "Ticket #[TICKET_ID] submitted. We'll follow up shortly.",
            &PhraseClassifier,
            &tickets,
        );

        if advanced.context.phase == Phase::Complete && context.phase != Phase::Complete {
            prop_assert!(!advanced.reply.contains(signal::TICKET_PLACEHOLDER));
            prop_assert!(advanced.reply.contains("T-1000"));
        }
    }
}

/// Ids minted over a process lifetime never collide.
#[test]
fn minted_tickets_are_unique_across_sessions() {
    use std::collections::HashSet;

    let tickets = TicketMinter::new();
    let mut seen = HashSet::new();

    for _ in 0..1000 {
        let advanced = advance(
            &TicketContext::default(),
            "Ticket #[TICKET_ID] submitted. We'll follow up shortly.",
            &PhraseClassifier,
            &tickets,
        );
        let id = advanced.context.ticket_id.expect("issuance mints an id");
        assert!(seen.insert(id), "duplicate ticket id minted");
    }
}
