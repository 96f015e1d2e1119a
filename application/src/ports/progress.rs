//! Progress notification port
//!
//! Defines the interface for reporting progress during an intake run.

use crew_domain::{RunPhase, SubmissionReceipt, SynthesizedDecision, WorkerKind, WorkerResult};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain lines, nothing).
pub trait RunProgressNotifier: Send + Sync {
    /// Called on every coordinator phase transition
    fn on_phase(&self, phase: RunPhase);

    /// Called when a worker is spawned
    fn on_worker_start(&self, worker: WorkerKind);

    /// Called when a worker's result is collected (including timeouts)
    fn on_worker_complete(&self, result: &WorkerResult);

    /// Called once the decision is built
    fn on_decision(&self, _decision: &SynthesizedDecision) {}

    /// Called after the decision sink acknowledged
    fn on_submitted(&self, _receipt: &SubmissionReceipt) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl RunProgressNotifier for NoProgress {
    fn on_phase(&self, _phase: RunPhase) {}
    fn on_worker_start(&self, _worker: WorkerKind) {}
    fn on_worker_complete(&self, _result: &WorkerResult) {}
}
