//! Worker outcomes - one per worker per run

use super::kind::WorkerKind;
use super::reports::WorkerReport;
use crate::tool::value_objects::{ToolError, ToolErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a worker failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Required input keys were absent; no tool was called
    InsufficientInput,
    /// A transient tool failure survived every retry
    ToolTransient,
    /// A tool failed in a way retrying cannot fix
    ToolPermanent,
    /// A tool call or the run deadline timed out
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InsufficientInput => "insufficient_input",
            FailureKind::ToolTransient => "tool_transient",
            FailureKind::ToolPermanent => "tool_permanent",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure descriptor recorded in place of a report
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct WorkerFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl WorkerFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn insufficient_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InsufficientInput, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }
}

impl From<ToolError> for WorkerFailure {
    fn from(error: ToolError) -> Self {
        let kind = match error.kind {
            ToolErrorKind::Timeout => FailureKind::Timeout,
            k if k.is_transient() => FailureKind::ToolTransient,
            _ => FailureKind::ToolPermanent,
        };
        Self::new(kind, error.to_string())
    }
}

/// Tagged outcome of one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum WorkerOutcome {
    Success(WorkerReport),
    Failure(WorkerFailure),
}

/// Result collected by the coordinator for one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub worker: WorkerKind,
    pub outcome: WorkerOutcome,
    /// Wall time the worker ran for
    pub elapsed_ms: u64,
}

impl WorkerResult {
    pub fn success(report: WorkerReport, elapsed_ms: u64) -> Self {
        Self {
            worker: report.kind(),
            outcome: WorkerOutcome::Success(report),
            elapsed_ms,
        }
    }

    pub fn failure(worker: WorkerKind, failure: WorkerFailure, elapsed_ms: u64) -> Self {
        Self {
            worker,
            outcome: WorkerOutcome::Failure(failure),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, WorkerOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&WorkerReport> {
        match &self.outcome {
            WorkerOutcome::Success(report) => Some(report),
            WorkerOutcome::Failure(_) => None,
        }
    }

    pub fn failure_info(&self) -> Option<&WorkerFailure> {
        match &self.outcome {
            WorkerOutcome::Success(_) => None,
            WorkerOutcome::Failure(failure) => Some(failure),
        }
    }
}
