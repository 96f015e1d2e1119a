//! Tool configuration from TOML (`[tools]` section)
//!
//! ```toml
//! [tools]
//! endpoint = "http://localhost:9000"
//! timeout_secs = 30
//! max_retries = 2
//! base_delay_ms = 250
//! max_delay_ms = 5000
//! history_file = "./history.json"
//!
//! [tools.overrides.transcribe_audio]
//! timeout_secs = 120
//! max_retries = 1
//! ```

use crew_domain::ToolPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw tool configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Base URL of the inference tool service
    pub endpoint: Option<String>,
    /// Per-attempt timeout applied to every tool
    pub timeout_secs: u64,
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,
    /// First backoff delay
    pub base_delay_ms: u64,
    /// Cap for any single backoff delay
    pub max_delay_ms: u64,
    /// JSON file answering `retrieve_history` locally instead of remotely
    pub history_file: Option<String>,
    /// Per-tool policy overrides, keyed by tool name
    pub overrides: BTreeMap<String, FileToolOverride>,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        let policy = ToolPolicy::default();
        Self {
            endpoint: None,
            timeout_secs: policy.timeout.as_secs(),
            max_retries: policy.max_retries,
            base_delay_ms: duration_ms(policy.base_delay),
            max_delay_ms: duration_ms(policy.max_delay),
            history_file: None,
            overrides: BTreeMap::new(),
        }
    }
}

/// Partial policy for one tool; unset fields inherit from `[tools]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolOverride {
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl FileToolsConfig {
    /// Endpoint without a trailing slash, if configured and non-blank.
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }

    /// Policy for tools without an override.
    pub fn default_policy(&self) -> ToolPolicy {
        ToolPolicy::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
    }

    /// Fully resolved per-tool overrides.
    pub fn override_policies(&self) -> Vec<(String, ToolPolicy)> {
        let base = self.default_policy();
        self.overrides
            .iter()
            .map(|(name, o)| {
                let mut policy = base;
                if let Some(secs) = o.timeout_secs {
                    policy = policy.with_timeout(Duration::from_secs(secs));
                }
                if let Some(retries) = o.max_retries {
                    policy = policy.with_max_retries(retries);
                }
                if let Some(ms) = o.base_delay_ms {
                    policy = policy.with_base_delay(Duration::from_millis(ms));
                }
                if let Some(ms) = o.max_delay_ms {
                    policy = policy.with_max_delay(Duration::from_millis(ms));
                }
                (name.clone(), policy)
            })
            .collect()
    }
}
