//! Run-scoped context store with namespaced write ownership

use super::{ContextError, ContextSnapshot, Writer};
use crate::worker::WorkerKind;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// A stored value with its audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub value: Value,
    pub writer: Writer,
    /// Audit only; never used for ordering
    pub written_at: DateTime<Utc>,
}

/// Key→value mapping for one orchestration run.
///
/// Ownership rules enforced by [`set`](Self::set):
///
/// | Key | Allowed writer |
/// |-----|----------------|
/// | `scribe.*`, `radiology.*`, `records.*` | that worker, once per key |
/// | anything else | bootstrap, until [`seal_inputs`](Self::seal_inputs) |
#[derive(Debug, Default)]
pub struct ContextStore {
    entries: BTreeMap<String, ContextEntry>,
    sealed: bool,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `writer` may write `key` right now, without writing.
    pub fn authorize(&self, writer: Writer, key: &str) -> Result<(), ContextError> {
        match WorkerKind::owner_of(key) {
            Some(owner) => {
                if writer != Writer::Worker(owner) {
                    return Err(ContextError::NamespaceViolation {
                        key: key.to_string(),
                        writer,
                        owner: Writer::Worker(owner),
                    });
                }
                if self.entries.contains_key(key) {
                    return Err(ContextError::AlreadyWritten(key.to_string()));
                }
            }
            None => {
                if writer != Writer::Bootstrap {
                    return Err(ContextError::NamespaceViolation {
                        key: key.to_string(),
                        writer,
                        owner: Writer::Bootstrap,
                    });
                }
                if self.sealed {
                    return Err(ContextError::InputsSealed(key.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Write `value` under `key` on behalf of `writer`.
    pub fn set(
        &mut self,
        writer: Writer,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), ContextError> {
        let key = key.into();
        self.authorize(writer, &key)?;

        self.entries.insert(
            key,
            ContextEntry {
                value,
                writer,
                written_at: Utc::now(),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&Value, ContextError> {
        self.entries
            .get(key)
            .map(|entry| &entry.value)
            .ok_or_else(|| ContextError::MissingKey(key.to_string()))
    }

    /// Full entry including writer and timestamp.
    pub fn entry(&self, key: &str) -> Option<&ContextEntry> {
        self.entries.get(key)
    }

    /// Freeze the input keys; only namespaced writes are accepted afterwards.
    pub fn seal_inputs(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Immutable copy for concurrent readers.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot::new(
            self.entries
                .iter()
                .map(|(k, entry)| (k.clone(), entry.value.clone()))
                .collect(),
        )
    }

    /// Keys written into `worker`'s namespace so far.
    pub fn namespace_keys(&self, worker: WorkerKind) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| k.starts_with(worker.namespace()))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
