//! Immutable point-in-time view of the context store

use super::ContextError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only copy of the context handed to workers and to synthesis.
///
/// Cloning is cheap (`Arc`), so every worker receives its own handle to the
/// same frozen map; later writes to the store never show through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    values: Arc<BTreeMap<String, Value>>,
}

impl ContextSnapshot {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    /// Builds a snapshot from key/value pairs (tests, fixtures).
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Like [`get`](Self::get) but fails with `MissingKey`.
    pub fn require(&self, key: &str) -> Result<&Value, ContextError> {
        self.values
            .get(key)
            .ok_or_else(|| ContextError::MissingKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the value as text when it is a non-blank string.
    ///
    /// This is the single definition of "input present" used by workers:
    /// absent keys, JSON null and blank strings all count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
