//! Orchestration domain entities

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinator lifecycle for one run.
///
/// ```text
/// Idle ──▶ Dispatched ──▶ Collecting ──▶ Complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    /// Nothing started yet
    Idle,
    /// All workers spawned
    Dispatched,
    /// Waiting for every worker to terminate
    Collecting,
    /// All results collected and folded into the context
    Complete,
}

impl RunPhase {
    pub fn as_str(&self) -> &str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Dispatched => "dispatched",
            RunPhase::Collecting => "collecting",
            RunPhase::Complete => "complete",
        }
    }

    /// The only phase reachable from `self`, if any.
    pub fn next(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Idle => Some(RunPhase::Dispatched),
            RunPhase::Dispatched => Some(RunPhase::Collecting),
            RunPhase::Collecting => Some(RunPhase::Complete),
            RunPhase::Complete => None,
        }
    }

    /// Move to `to`, rejecting anything but the single forward step.
    pub fn transition(self, to: RunPhase) -> Result<RunPhase, OrchestrationError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(OrchestrationError::InvalidTransition { from: self, to })
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised by orchestration bookkeeping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: RunPhase, to: RunPhase },

    #[error("Result for worker '{0}' was already collected")]
    DuplicateResult(crate::worker::WorkerKind),

    #[error("Fan-in incomplete: missing results for {0:?}")]
    Incomplete(Vec<crate::worker::WorkerKind>),
}
