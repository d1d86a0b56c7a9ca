//! Trait definitions for Redraft.

/// Sink for the cost of successful completions.
///
/// The fan-out orchestrator calls [`CostRecorder::record`] exactly once per
/// successful target. Implementations must tolerate concurrent calls.
pub trait CostRecorder: Send + Sync {
    /// Records one successful request costing `cost` USD.
    fn record(&self, cost: f64);
}

impl<T: CostRecorder + ?Sized> CostRecorder for std::sync::Arc<T> {
    fn record(&self, cost: f64) {
        (**self).record(cost);
    }
}
