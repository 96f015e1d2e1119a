//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `audio_ref` → transcript + confidence
pub const TRANSCRIBE_AUDIO: &str = "transcribe_audio";
/// transcript / notes → structured clinical entities
pub const ANALYZE_CLINICAL_NOTES: &str = "analyze_clinical_notes";
/// condition terms → ICD-11 codes
pub const MAP_ICD_CODES: &str = "map_icd_codes";
/// `image_ref` → imaging findings
pub const ANALYZE_RADIOLOGY: &str = "analyze_radiology";
/// `subject_id` → prior-record risk flags
pub const RETRIEVE_HISTORY: &str = "retrieve_history";
/// mapped conditions → labeled treatment options
pub const SUGGEST_TREATMENTS: &str = "suggest_treatments";
/// decision → backend receipt
pub const SUBMIT_DECISION: &str = "submit_decision";

/// Every tool the orchestration engine may call.
pub const ALL_TOOLS: [&str; 7] = [
    TRANSCRIBE_AUDIO,
    ANALYZE_CLINICAL_NOTES,
    MAP_ICD_CODES,
    SUGGEST_TREATMENTS,
    ANALYZE_RADIOLOGY,
    RETRIEVE_HISTORY,
    SUBMIT_DECISION,
];

/// A call to a tool with JSON arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool (a JSON object)
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Timeout and retry policy attached to an invocation.
///
/// Backoff is exponential: attempt `n` (0-based) waits
/// `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Retries after the first attempt (transient failures only)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap for any single backoff delay
    pub max_delay: Duration,
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl ToolPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = self.max_delay.max(base_delay);
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay.max(self.base_delay);
        self
    }

    /// Total attempts the policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis();
        if base_ms == 0 {
            return Duration::ZERO;
        }
        let max_ms = self.max_delay.as_millis().max(base_ms);
        let multiplier = 1u128 << attempt.min(20);
        let delay_ms = base_ms.saturating_mul(multiplier).min(max_ms);
        Duration::from_millis(u64::try_from(delay_ms).unwrap_or(u64::MAX))
    }
}
