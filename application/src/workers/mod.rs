//! Specialist workers
//!
//! Each worker reads its inputs from a [`ContextSnapshot`], calls its tools
//! sequentially through the [`ToolGateway`](crate::gateway::ToolGateway)
//! and returns exactly one [`WorkerResult`]. Workers never write to the
//! context; the coordinator folds their reports back after fan-in.

pub mod radiology;
pub mod records;
pub mod scribe;

pub use radiology::RadiologyWorker;
pub use records::RecordsWorker;
pub use scribe::ScribeWorker;

use async_trait::async_trait;
use crew_domain::{ContextSnapshot, WorkerFailure, WorkerKind, WorkerReport, WorkerResult};
use std::time::Instant;
use tracing::debug;

/// What a worker is handed at dispatch.
#[derive(Debug, Clone)]
pub struct WorkerAssignment {
    /// Instruction template already expanded against `snapshot`
    pub instruction: String,
    /// Read-only view of the bootstrapped context
    pub snapshot: ContextSnapshot,
}

impl WorkerAssignment {
    pub fn new(instruction: impl Into<String>, snapshot: ContextSnapshot) -> Self {
        Self {
            instruction: instruction.into(),
            snapshot,
        }
    }
}

/// Shared contract of the three specialists.
#[async_trait]
pub trait SpecialistWorker: Send + Sync {
    fn kind(&self) -> WorkerKind;

    /// Produce the worker's report or the reason it could not.
    async fn produce(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerFailure>;

    /// Run to completion, timing the attempt. Never panics on tool failure.
    async fn run(&self, assignment: WorkerAssignment) -> WorkerResult {
        let started = Instant::now();
        let outcome = self.produce(&assignment).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(report) => WorkerResult::success(report, elapsed_ms),
            Err(failure) => {
                debug!(
                    worker = %self.kind(),
                    kind = %failure.kind,
                    "Worker failed: {}",
                    failure.message
                );
                WorkerResult::failure(self.kind(), failure, elapsed_ms)
            }
        }
    }
}
