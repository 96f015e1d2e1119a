//! Port for structured run-event logging.
//!
//! Defines the [`RunEventLogger`] trait for recording what happened during a
//! run (bootstrap, dispatch, every tool invocation, worker results, the
//! decision and its submission) to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, this port carries the audit trail (JSONL).

use serde_json::Value;

/// A structured run event.
///
/// The adapter adds the UTC timestamp when it writes the record.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEvent {
    /// Event type identifier (e.g. "tool_call", "worker_result").
    pub event_type: &'static str,
    /// Event-specific fields
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging run events.
///
/// `log` is synchronous and infallible; a logging failure must never change
/// the outcome of a run.
pub trait RunEventLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when the run log is disabled.
pub struct NoRunEventLogger;

impl RunEventLogger for NoRunEventLogger {
    fn log(&self, _event: RunEvent) {}
}
