//! Ticket identifier minting

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mints process-unique ticket identifiers in the `T-<n>` format.
///
/// Uniqueness is by construction: a monotonic counter, seeded at a random
/// four-digit base so ids from different runs don't all start at the same
/// value.
#[derive(Debug)]
pub struct TicketMinter {
    next: AtomicU64,
}

impl TicketMinter {
    pub fn new() -> Self {
        Self::seeded(rand::thread_rng().gen_range(1000..5000))
    }

    /// Counter starting at a fixed base; deterministic ids for tests.
    pub fn seeded(base: u64) -> Self {
        Self {
            next: AtomicU64::new(base),
        }
    }

    pub fn mint(&self) -> String {
        format!("T-{}", self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TicketMinter {
    fn default() -> Self {
        Self::new()
    }
}
