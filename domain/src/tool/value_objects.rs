//! Tool domain value objects: failure classification and invocation records
//!
//! [`ToolErrorKind`] drives the gateway's **retry strategy**:
//!
//! | Kind | Transient? | Typical cause |
//! |------|-----------|---------------|
//! | `Network` | Yes | connection refused / reset |
//! | `Timeout` | Yes | attempt exceeded the policy timeout |
//! | `Unavailable` | Yes | HTTP 5xx, 429 |
//! | `InvalidInput` | No | malformed arguments, HTTP 400/422 |
//! | `Unauthorized` | No | HTTP 401/403 |
//! | `UnknownTool` | No | no adapter registered |
//! | `MalformedOutput` | No | output could not be decoded |
//! | `Rejected` | No | any other refusal |

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure classification for a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    Network,
    Timeout,
    Unavailable,
    InvalidInput,
    Unauthorized,
    UnknownTool,
    MalformedOutput,
    Rejected,
}

impl ToolErrorKind {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ToolErrorKind::Network | ToolErrorKind::Timeout | ToolErrorKind::Unavailable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::Network => "network",
            ToolErrorKind::Timeout => "timeout",
            ToolErrorKind::Unavailable => "unavailable",
            ToolErrorKind::InvalidInput => "invalid_input",
            ToolErrorKind::Unauthorized => "unauthorized",
            ToolErrorKind::UnknownTool => "unknown_tool",
            ToolErrorKind::MalformedOutput => "malformed_output",
            ToolErrorKind::Rejected => "rejected",
        }
    }

    /// Classify an HTTP status returned by a remote tool.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 | 403 => ToolErrorKind::Unauthorized,
            400 | 422 => ToolErrorKind::InvalidInput,
            404 => ToolErrorKind::UnknownTool,
            408 => ToolErrorKind::Timeout,
            429 => ToolErrorKind::Unavailable,
            s if s >= 500 => ToolErrorKind::Unavailable,
            _ => ToolErrorKind::Rejected,
        }
    }
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error that occurred during tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Tool that failed
    pub tool: String,
    pub kind: ToolErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("no adapter registered for '{}'", tool);
        Self::new(tool, ToolErrorKind::UnknownTool, message)
    }

    pub fn invalid_input(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tool, ToolErrorKind::InvalidInput, message)
    }

    pub fn malformed_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(tool, ToolErrorKind::MalformedOutput, message)
    }

    pub fn timeout(tool: impl Into<String>, after: Duration) -> Self {
        Self::new(
            tool,
            ToolErrorKind::Timeout,
            format!("timed out after {}ms", after.as_millis()),
        )
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.tool, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Telemetry record of one gateway invocation (all attempts included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolInvocation {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
