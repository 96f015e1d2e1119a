//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// dir = "~/.local/share/diagnostic-crew/logs"
/// run_log = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily rolling diagnostic log and the run logs
    pub dir: Option<String>,
    /// Write a JSONL run event log per run (requires `dir`)
    pub run_log: bool,
}

impl FileLoggingConfig {
    /// Log directory with a leading `~` expanded.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        let dir = self.dir.as_deref()?.trim();
        if dir.is_empty() {
            return None;
        }
        if let Some(rest) = dir.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return Some(home.join(rest));
        }
        Some(PathBuf::from(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_dir_is_none() {
        assert!(FileLoggingConfig::default().resolved_dir().is_none());
    }

    #[test]
    fn test_plain_dir() {
        let config = FileLoggingConfig {
            dir: Some("/var/log/crew".to_string()),
            run_log: true,
        };
        assert_eq!(config.resolved_dir(), Some(PathBuf::from("/var/log/crew")));
    }
}
