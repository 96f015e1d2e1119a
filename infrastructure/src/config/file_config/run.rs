//! Run configuration from TOML (`[run]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw run configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Seconds the coordinator waits for the workers before giving up on
    /// the stragglers
    pub deadline_secs: u64,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self { deadline_secs: 120 }
    }
}

impl FileRunConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
