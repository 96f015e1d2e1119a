//! Fan-out/fan-in coordinator
//!
//! Dispatches the three specialists concurrently on one context snapshot,
//! waits for all of them under the run deadline, then folds each success
//! back into the context under its owner's namespace.

use crate::gateway::ToolGateway;
use crate::ports::progress::RunProgressNotifier;
use crate::ports::run_logger::{NoRunEventLogger, RunEvent, RunEventLogger};
use crate::workers::{
    RadiologyWorker, RecordsWorker, ScribeWorker, SpecialistWorker, WorkerAssignment,
};
use crew_domain::{
    ContextError, ContextStore, FailureKind, FanInRecord, InstructionSet, OrchestrationError,
    RunPhase, TemplateError, WorkerFailure, WorkerKind, WorkerResult, Writer, expand,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that stop coordination outright
#[derive(Error, Debug)]
pub enum CoordinateError {
    #[error("Instruction template for {worker} is invalid: {source}")]
    Configuration {
        worker: WorkerKind,
        #[source]
        source: TemplateError,
    },

    #[error("Worker roster must contain scribe, radiology and records exactly once")]
    InvalidRoster,

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Failed to encode worker report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why collection stopped before every worker returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interruption {
    Deadline,
    Cancelled,
}

/// Coordinator for one run. Single-owner: create one per run.
pub struct CrewCoordinator {
    workers: Vec<Arc<dyn SpecialistWorker>>,
    deadline: Duration,
    phase: RunPhase,
    logger: Arc<dyn RunEventLogger>,
    cancellation: Option<CancellationToken>,
}

impl CrewCoordinator {
    pub fn new(workers: Vec<Arc<dyn SpecialistWorker>>, deadline: Duration) -> Self {
        Self {
            workers,
            deadline,
            phase: RunPhase::Idle,
            logger: Arc::new(NoRunEventLogger),
            cancellation: None,
        }
    }

    /// The standard roster, all three sharing `gateway`.
    pub fn standard(gateway: Arc<ToolGateway>) -> Self {
        let deadline = gateway.params().deadline;
        Self::new(
            vec![
                Arc::new(ScribeWorker::new(Arc::clone(&gateway))),
                Arc::new(RadiologyWorker::new(Arc::clone(&gateway))),
                Arc::new(RecordsWorker::new(gateway)),
            ],
            deadline,
        )
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Cancelling the token ends collection like an expired deadline.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn advance(
        &mut self,
        to: RunPhase,
        progress: &dyn RunProgressNotifier,
    ) -> Result<(), OrchestrationError> {
        self.phase = self.phase.transition(to)?;
        info!("Coordinator phase: {}", self.phase);
        progress.on_phase(self.phase);
        Ok(())
    }

    fn check_roster(&self) -> Result<(), CoordinateError> {
        let kinds: BTreeSet<WorkerKind> = self.workers.iter().map(|w| w.kind()).collect();
        if self.workers.len() == WorkerKind::ALL.len() && kinds.len() == WorkerKind::ALL.len() {
            Ok(())
        } else {
            Err(CoordinateError::InvalidRoster)
        }
    }

    async fn interrupted(token: Option<CancellationToken>) {
        match token {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    /// Run the fan-out/fan-in over a bootstrapped, sealed store.
    ///
    /// Always yields exactly one result per worker. Template expansion
    /// happens before any worker is spawned; a failure there aborts with
    /// [`CoordinateError::Configuration`] and nothing is dispatched.
    pub async fn coordinate(
        &mut self,
        store: &mut ContextStore,
        instructions: &InstructionSet,
        progress: &dyn RunProgressNotifier,
    ) -> Result<FanInRecord, CoordinateError> {
        self.check_roster()?;
        let snapshot = store.snapshot();

        let mut assignments = Vec::with_capacity(self.workers.len());
        for worker in &self.workers {
            let kind = worker.kind();
            let instruction = expand(instructions.for_worker(kind), &snapshot)
                .map_err(|source| CoordinateError::Configuration { worker: kind, source })?;
            assignments.push((
                Arc::clone(worker),
                WorkerAssignment::new(instruction, snapshot.clone()),
            ));
        }

        // ==================== Fan-out ====================

        self.advance(RunPhase::Dispatched, progress)?;
        let started = Instant::now();
        let mut join_set = JoinSet::new();
        for (worker, assignment) in assignments {
            let kind = worker.kind();
            progress.on_worker_start(kind);
            join_set.spawn(async move { (kind, worker.run(assignment).await) });
        }
        self.logger.log(RunEvent::new(
            "dispatch",
            json!({
                "workers": WorkerKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
                "deadline_ms": self.deadline.as_millis() as u64,
            }),
        ));

        // ==================== Fan-in ====================

        self.advance(RunPhase::Collecting, progress)?;
        let mut record = FanInRecord::new();
        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);
        let interrupted = Self::interrupted(self.cancellation.clone());
        tokio::pin!(interrupted);

        let interruption = loop {
            tokio::select! {
                joined = join_set.join_next() => match joined {
                    Some(Ok((kind, result))) => {
                        self.collect(store, &mut record, kind, result, progress)
                    }
                    Some(Err(e)) => warn!("Worker task failed: {}", e),
                    None => break None,
                },
                _ = &mut deadline => {
                    warn!(
                        "Run deadline of {}ms expired with {} worker(s) outstanding",
                        self.deadline.as_millis(),
                        join_set.len()
                    );
                    break Some(Interruption::Deadline);
                }
                _ = &mut interrupted => {
                    warn!("Run cancelled with {} worker(s) outstanding", join_set.len());
                    break Some(Interruption::Cancelled);
                }
            }
        };

        if interruption.is_some() {
            join_set.abort_all();
            // Keep anything that finished in the same instant; aborted tasks yield errors.
            while let Some(joined) = join_set.join_next().await {
                if let Ok((kind, result)) = joined {
                    self.collect(store, &mut record, kind, result, progress);
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        for kind in record.missing() {
            let failure = match interruption {
                Some(Interruption::Deadline) => WorkerFailure::timeout(format!(
                    "run deadline of {}ms expired",
                    self.deadline.as_millis()
                )),
                Some(Interruption::Cancelled) => WorkerFailure::timeout("run cancelled"),
                None => WorkerFailure::new(FailureKind::ToolPermanent, "worker task panicked"),
            };
            let result = WorkerResult::failure(kind, failure, elapsed_ms);
            self.collect(store, &mut record, kind, result, progress);
        }
        record.ensure_complete()?;

        // ==================== Fold ====================

        self.advance(RunPhase::Complete, progress)?;
        for result in record.successes() {
            if let Some(report) = result.report() {
                let value = report.to_context_value()?;
                store.set(Writer::Worker(result.worker), result.worker.report_key(), value)?;
            }
        }

        info!(
            "Fan-in complete: {} succeeded, {} failed in {}ms",
            record.successes().count(),
            record.failures().count(),
            elapsed_ms
        );
        Ok(record)
    }

    /// Record one worker's result, rejecting a report aimed at another
    /// worker's namespace.
    fn collect(
        &self,
        store: &ContextStore,
        record: &mut FanInRecord,
        dispatched: WorkerKind,
        result: WorkerResult,
        progress: &dyn RunProgressNotifier,
    ) {
        let key = result.worker.report_key();
        let result = match store.authorize(Writer::Worker(dispatched), &key) {
            Ok(()) => result,
            Err(violation) => {
                warn!(worker = %dispatched, "Rejected worker output: {}", violation);
                WorkerResult::failure(
                    dispatched,
                    WorkerFailure::new(FailureKind::ToolPermanent, violation.to_string()),
                    result.elapsed_ms,
                )
            }
        };

        match &result.outcome {
            crew_domain::WorkerOutcome::Success(_) => {
                info!(worker = %result.worker, elapsed_ms = result.elapsed_ms, "Worker succeeded");
            }
            crew_domain::WorkerOutcome::Failure(failure) => {
                warn!(
                    worker = %result.worker,
                    kind = %failure.kind,
                    "Worker failed: {}",
                    failure.message
                );
            }
        }

        self.logger.log(RunEvent::new(
            "worker_result",
            json!({
                "worker": result.worker.as_str(),
                "success": result.is_success(),
                "failure_kind": result.failure_info().map(|f| f.kind.as_str()),
                "message": result.failure_info().map(|f| f.message.clone()),
                "elapsed_ms": result.elapsed_ms,
            }),
        ));
        progress.on_worker_complete(&result);

        if let Err(e) = record.record(result) {
            warn!("Ignoring result: {}", e);
        }
    }
}
