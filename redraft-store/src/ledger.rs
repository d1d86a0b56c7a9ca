//! Session cost ledger.
//!
//! Accumulates the cost and request count of every successful target in the
//! current session. One ledger is shared by all rounds; records from
//! concurrent targets are serialized by a single short critical section.

use std::sync::{Mutex, MutexGuard, PoisonError};

use redraft_core::{CostRecorder, SessionTotals};
use tracing::{debug, warn};

/// Running session totals.
#[derive(Debug, Default)]
pub struct SessionLedger {
    totals: Mutex<SessionTotals>,
}

impl SessionLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger starting from a persisted snapshot.
    pub fn with_totals(totals: SessionTotals) -> Self {
        Self {
            totals: Mutex::new(totals),
        }
    }

    // The guarded value is plain data, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SessionTotals> {
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one request costing `cost`.
    ///
    /// Negative and non-finite costs are ignored.
    pub fn record(&self, cost: f64) {
        if !cost.is_finite() || cost < 0.0 {
            warn!(cost, "Ignoring invalid cost");
            return;
        }
        let mut totals = self.lock();
        totals.total_cost += cost;
        totals.request_count += 1;
        debug!(cost, total = totals.total_cost, count = totals.request_count, "Cost recorded");
    }

    /// Zeroes the totals.
    pub fn reset(&self) {
        *self.lock() = SessionTotals::default();
        debug!("Ledger reset");
    }

    /// Replaces the totals with a persisted snapshot.
    pub fn restore(&self, totals: SessionTotals) {
        *self.lock() = totals;
    }

    /// Returns a consistent copy of the totals.
    pub fn snapshot(&self) -> SessionTotals {
        *self.lock()
    }
}

impl CostRecorder for SessionLedger {
    fn record(&self, cost: f64) {
        SessionLedger::record(self, cost);
    }
}

// ============================================================================
// Tests
// ============================================================================
