//! Concurrent fan-out of one request to many targets.
//!
//! A round sends the same [`NormalizedRequest`] to every [`ModelTarget`] at
//! once, one tokio task per target. Targets never wait on one another and a
//! failure (or panic) in one target only ever produces a failure result for
//! that target.
//!
//! Progress is streamed as [`RoundEvent`]s:
//!
//! 1. one `Loading` event per target, emitted synchronously by
//!    [`FanOut::dispatch`] before any task is spawned
//! 2. one `Finished` event per target, in completion order
//!
//! [`FanOutRound::join`] waits for all targets and returns the results in
//! slot order.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use redraft_core::{
    CostRecorder, FailureKind, ModelTarget, NormalizedRequest, NormalizedResult, ProviderKind,
    TargetUpdate, TokenUsage, ValidationError, validate_round,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::adapter::ProviderAdapter;
use crate::context::FetchContext;
use crate::error::ProviderError;

// ============================================================================
// Round Events
// ============================================================================

/// Progress of a single target within a round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    /// The target's call is in flight.
    Loading {
        /// Slot id.
        target_id: String,
    },
    /// The target produced its result.
    Finished(NormalizedResult),
}

impl RoundEvent {
    /// Slot id this event refers to.
    pub fn target_id(&self) -> &str {
        match self {
            Self::Loading { target_id } => target_id,
            Self::Finished(result) => &result.target_id,
        }
    }

    /// Converts the event into a panel update.
    pub fn to_update(&self) -> TargetUpdate {
        match self {
            Self::Loading { target_id } => TargetUpdate::loading(target_id.clone()),
            Self::Finished(result) => TargetUpdate::finished(result),
        }
    }
}

// ============================================================================
// Fan-out Round
// ============================================================================

struct PendingTarget {
    target_id: String,
    provider: ProviderKind,
    handle: JoinHandle<NormalizedResult>,
}

/// A dispatched round.
///
/// Dropping the round does not cancel in-flight calls; their results are
/// still recorded.
pub struct FanOutRound {
    events: mpsc::UnboundedReceiver<RoundEvent>,
    pending: Vec<PendingTarget>,
}

impl FanOutRound {
    /// Number of targets in the round.
    pub fn target_count(&self) -> usize {
        self.pending.len()
    }

    /// Slot ids in dispatch order.
    pub fn target_ids(&self) -> Vec<&str> {
        self.pending.iter().map(|p| p.target_id.as_str()).collect()
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once every target has finished and all events were
    /// consumed.
    pub async fn next_event(&mut self) -> Option<RoundEvent> {
        self.events.recv().await
    }

    /// Waits for every target and returns the results in slot order.
    ///
    /// Unconsumed events are discarded.
    pub async fn join(self) -> Vec<NormalizedResult> {
        let mut results = Vec::with_capacity(self.pending.len());
        for pending in self.pending {
            let result = match pending.handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(target = %pending.target_id, error = %e, "Target task did not complete");
                    NormalizedResult::failure(
                        pending.target_id,
                        pending.provider,
                        FailureKind::Response,
                        format!("Internal error: {e}"),
                    )
                }
            };
            results.push(result);
        }
        results
    }
}

impl std::fmt::Debug for FanOutRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutRound")
            .field("targets", &self.target_ids())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fan-out Orchestrator
// ============================================================================

/// Dispatches rounds to registered provider adapters.
///
/// Concurrent rounds are allowed; callers that want one round at a time
/// must serialize themselves.
#[derive(Clone)]
pub struct FanOut {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    ctx: Arc<FetchContext>,
    recorder: Option<Arc<dyn CostRecorder>>,
}

impl FanOut {
    /// Creates an orchestrator with no adapters.
    pub fn new(ctx: Arc<FetchContext>) -> Self {
        Self {
            adapters: HashMap::new(),
            ctx,
            recorder: None,
        }
    }

    /// Registers an adapter, replacing any adapter of the same kind.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        debug!(provider = ?adapter.kind(), "Registering adapter");
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// Registers an adapter (builder style).
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Sets the sink that receives the cost of every successful target.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn CostRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Returns true if an adapter is registered for `provider`.
    pub fn has_adapter(&self, provider: ProviderKind) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Validates a round without dispatching it.
    pub fn validate(
        &self,
        request: &NormalizedRequest,
        targets: &[ModelTarget],
    ) -> Result<(), ValidationError> {
        validate_round(request, targets)?;
        for target in targets {
            if !self.has_adapter(target.provider()) {
                return Err(ValidationError::NoAdapter(target.provider()));
            }
        }
        Ok(())
    }

    /// Validates and dispatches a round.
    ///
    /// On validation failure nothing is sent. Otherwise every target is
    /// marked loading before this function returns, and one task per
    /// target is running.
    ///
    /// Must be called within a tokio runtime.
    #[instrument(skip(self, request, targets), fields(targets = targets.len()))]
    pub fn dispatch(
        &self,
        request: NormalizedRequest,
        targets: Vec<ModelTarget>,
    ) -> Result<FanOutRound, ValidationError> {
        self.validate(&request, &targets)?;

        let (tx, rx) = mpsc::unbounded_channel();

        // Every target is loading before the first task can make progress.
        for target in &targets {
            let _ = tx.send(RoundEvent::Loading {
                target_id: target.id.clone(),
            });
        }

        info!(count = targets.len(), "Dispatching round");

        let request = Arc::new(request);
        let mut pending = Vec::with_capacity(targets.len());

        for target in targets {
            // validate() guarantees the adapter exists
            let Some(adapter) = self.adapters.get(&target.provider()).cloned() else {
                continue;
            };
            let target_id = target.id.clone();
            let provider = target.provider();
            let job = TargetJob {
                adapter,
                ctx: Arc::clone(&self.ctx),
                recorder: self.recorder.clone(),
                target,
                request: Arc::clone(&request),
            };
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let result = job.run_isolated().await;
                // The receiver may be gone; the result is still returned.
                let _ = tx.send(RoundEvent::Finished(result.clone()));
                result
            });

            pending.push(PendingTarget {
                target_id,
                provider,
                handle,
            });
        }

        Ok(FanOutRound {
            events: rx,
            pending,
        })
    }

    /// Dispatches a round and waits for all of its results.
    pub async fn run(
        &self,
        request: NormalizedRequest,
        targets: Vec<ModelTarget>,
    ) -> Result<Vec<NormalizedResult>, ValidationError> {
        let round = self.dispatch(request, targets)?;
        Ok(round.join().await)
    }
}

impl std::fmt::Debug for FanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOut")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("recorder", &self.recorder.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Target Job
// ============================================================================

struct TargetJob {
    adapter: Arc<dyn ProviderAdapter>,
    ctx: Arc<FetchContext>,
    recorder: Option<Arc<dyn CostRecorder>>,
    target: ModelTarget,
    request: Arc<NormalizedRequest>,
}

impl TargetJob {
    /// Runs the job, turning a panic into a failure result.
    async fn run_isolated(self) -> NormalizedResult {
        let target_id = self.target.id.clone();
        let provider = self.target.provider();

        match AssertUnwindSafe(self.run()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(target = %target_id, provider = ?provider, "Target task panicked");
                NormalizedResult::failure(
                    target_id,
                    provider,
                    FailureKind::Response,
                    "Internal error while processing the response",
                )
            }
        }
    }

    async fn run(self) -> NormalizedResult {
        let start = Instant::now();
        let provider = self.target.provider();
        debug!(target = %self.target.id, model = %self.target.api_model(), "Invoking adapter");

        let outcome = self
            .adapter
            .invoke(&self.ctx, &self.target, &self.request)
            .await
            .and_then(|raw| {
                if raw.text.trim().is_empty() {
                    Err(ProviderError::invalid_response("Empty content in response"))
                } else {
                    Ok(raw)
                }
            });

        match outcome {
            Ok(raw) => {
                let input = self.adapter.sent_input(&self.target, &self.request);
                let usage =
                    TokenUsage::normalize(raw.usage.as_ref(), provider, &input, &raw.text);
                let cost = self.target.model.cost_for(&usage);

                if let Some(recorder) = &self.recorder {
                    recorder.record(cost);
                }

                info!(
                    target = %self.target.id,
                    model = %self.target.api_model(),
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    estimated = usage.is_estimated(),
                    cost,
                    duration_ms = start.elapsed().as_millis(),
                    "Target succeeded"
                );
                NormalizedResult::success(self.target.id, provider, raw.text, usage, cost)
            }
            Err(e) => {
                warn!(
                    target = %self.target.id,
                    model = %self.target.api_model(),
                    kind = %e.kind(),
                    error = %e,
                    duration_ms = start.elapsed().as_millis(),
                    "Target failed"
                );
                NormalizedResult::failure(self.target.id, provider, e.kind(), e.to_string())
            }
        }
    }
}
