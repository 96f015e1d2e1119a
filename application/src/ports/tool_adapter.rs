//! Tool adapter port
//!
//! One implementation per external capability (transcription, term
//! extraction, code mapping, imaging, history, submission). The
//! [`ToolGateway`](crate::gateway::ToolGateway) owns timeout and retry; an
//! adapter performs exactly one attempt and classifies its own failures.

use async_trait::async_trait;
use crew_domain::ToolError;
use serde_json::Value;

/// A single externally-provided tool.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Tool name as seen by callers (e.g. `analyze_radiology`)
    fn name(&self) -> &str;

    /// Perform one attempt with JSON arguments, returning the raw JSON output.
    ///
    /// Errors must carry a [`ToolErrorKind`](crew_domain::ToolErrorKind) so
    /// the gateway can decide whether to retry.
    async fn invoke(&self, arguments: &Value) -> Result<Value, ToolError>;
}
