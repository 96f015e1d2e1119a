//! Context domain
//!
//! The shared key→value state of one run. Bootstrap fills the input keys,
//! the store is sealed, workers read a [`ContextSnapshot`], and the
//! coordinator folds each successful report back under the owning worker's
//! namespace.

mod snapshot;
mod store;

pub use snapshot::ContextSnapshot;
pub use store::{ContextEntry, ContextStore};

use crate::worker::WorkerKind;
use thiserror::Error;

/// Identity of a context writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Writer {
    /// The bootstrap phase, owner of the input keys
    Bootstrap,
    /// A specialist worker, owner of its namespace
    Worker(WorkerKind),
}

impl std::fmt::Display for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Writer::Bootstrap => write!(f, "bootstrap"),
            Writer::Worker(kind) => write!(f, "{}", kind),
        }
    }
}

/// Errors raised by the context store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("Namespace violation: {writer} may not write '{key}' (owned by {owner})")]
    NamespaceViolation {
        key: String,
        writer: Writer,
        owner: Writer,
    },

    #[error("Missing context key: {0}")]
    MissingKey(String),

    #[error("Context key already written: {0}")]
    AlreadyWritten(String),

    #[error("Input keys are sealed, cannot write '{0}'")]
    InputsSealed(String),
}
