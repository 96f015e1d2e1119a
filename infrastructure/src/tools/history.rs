//! File-backed `retrieve_history`
//!
//! Answers history lookups from a local JSON document keyed by subject id,
//! for deployments without a records service:
//!
//! ```json
//! {
//!   "pt-42": {
//!     "risk_flags": ["smoker"],
//!     "chronic_conditions": ["asthma"],
//!     "allergies": ["penicillin"],
//!     "medications": ["salbutamol"]
//!   }
//! }
//! ```
//!
//! The file is re-read on every call so edits apply to the next run.

use async_trait::async_trait;
use crew_application::ToolAdapter;
use crew_domain::tool::entities::RETRIEVE_HISTORY;
use crew_domain::tool::payloads::{HistoryArgs, HistoryRecord};
use crew_domain::{ToolError, ToolErrorKind};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct LocalHistoryTool {
    path: PathBuf,
}

impl LocalHistoryTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, HistoryRecord>, ToolError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ToolError::new(
                RETRIEVE_HISTORY,
                ToolErrorKind::Rejected,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ToolError::malformed_output(
                RETRIEVE_HISTORY,
                format!("{} is not a history document: {}", self.path.display(), e),
            )
        })
    }
}

#[async_trait]
impl ToolAdapter for LocalHistoryTool {
    fn name(&self) -> &str {
        RETRIEVE_HISTORY
    }

    async fn invoke(&self, arguments: &Value) -> Result<Value, ToolError> {
        let args: HistoryArgs = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_input(RETRIEVE_HISTORY, e.to_string()))?;

        let mut records = self.load().await?;
        let record = records.remove(&args.subject_id).unwrap_or_else(|| {
            debug!(subject_id = %args.subject_id, "No history on file");
            HistoryRecord::default()
        });

        serde_json::to_value(record)
            .map_err(|e| ToolError::malformed_output(RETRIEVE_HISTORY, e.to_string()))
    }
}
