//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw backend configuration from TOML
///
/// ```toml
/// [backend]
/// url = "https://clinic.example.org/api"
/// token = "..."
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the patient backend; bootstrap and submission are
    /// disabled when unset
    pub url: Option<String>,
    /// Bearer token sent as the `Authorization` header
    pub token: Option<String>,
    /// Seconds a bootstrap request may take, response body included
    pub timeout_secs: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

impl FileBackendConfig {
    /// Base URL without a trailing slash, if configured and non-blank.
    pub fn base_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_slash() {
        let config = FileBackendConfig {
            url: Some("http://localhost:8000/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.base_url(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_blank_url_is_none() {
        let config = FileBackendConfig {
            url: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.base_url().is_none());
    }

    #[test]
    fn test_default_timeout() {
        let config: FileBackendConfig = toml::from_str(r#"url = "http://b""#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
