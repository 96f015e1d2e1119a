//! Tool registry wiring
//!
//! Builds the [`ToolGateway`] for a run from configuration:
//!
//! | Tool | Adapter | Registered when |
//! |------|---------|-----------------|
//! | `transcribe_audio`, `analyze_clinical_notes`, `map_icd_codes`, `suggest_treatments`, `analyze_radiology` | [`RemoteTool`] | `tools.endpoint` is set |
//! | `retrieve_history` | [`LocalHistoryTool`] | `tools.history_file` is set |
//! | `retrieve_history` | [`RemoteTool`] | otherwise, when `tools.endpoint` is set |
//! | `submit_decision` | [`HttpSubmissionTool`] | `backend.url` is set |
//!
//! A tool with no adapter is still callable; the gateway answers it with an
//! `UnknownTool` failure, which the calling worker reports as a permanent
//! tool failure.

use super::{LocalHistoryTool, RemoteTool};
use crate::backend::HttpSubmissionTool;
use crate::config::{ConfigError, FileConfig};
use crate::http::HttpClient;
use crew_application::{RunEventLogger, ToolAdapter, ToolGateway};
use crew_domain::tool::entities::{
    ANALYZE_CLINICAL_NOTES, ANALYZE_RADIOLOGY, MAP_ICD_CODES, RETRIEVE_HISTORY,
    SUGGEST_TREATMENTS, TRANSCRIBE_AUDIO,
};
use std::sync::Arc;
use tracing::{debug, warn};

const INFERENCE_TOOLS: [&str; 5] = [
    TRANSCRIBE_AUDIO,
    ANALYZE_CLINICAL_NOTES,
    MAP_ICD_CODES,
    SUGGEST_TREATMENTS,
    ANALYZE_RADIOLOGY,
];

/// Builds the gateway's adapter set from a [`FileConfig`].
pub struct ToolRegistry {
    adapters: Vec<Arc<dyn ToolAdapter>>,
}

impl ToolRegistry {
    pub fn from_config(config: &FileConfig) -> Result<Self, ConfigError> {
        let client = HttpClient::new(config.backend.token.clone())?;
        let mut adapters: Vec<Arc<dyn ToolAdapter>> = Vec::new();

        if let Some(endpoint) = config.tools.endpoint_url() {
            for name in INFERENCE_TOOLS {
                adapters.push(Arc::new(RemoteTool::new(client.clone(), endpoint, name)));
            }
        }

        match (&config.tools.history_file, config.tools.endpoint_url()) {
            (Some(path), _) => adapters.push(Arc::new(LocalHistoryTool::new(path))),
            (None, Some(endpoint)) => adapters.push(Arc::new(RemoteTool::new(
                client.clone(),
                endpoint,
                RETRIEVE_HISTORY,
            ))),
            (None, None) => {}
        }

        if let Some(url) = config.backend.base_url() {
            adapters.push(Arc::new(HttpSubmissionTool::new(client, url)));
        }

        Ok(Self { adapters })
    }

    pub fn adapters(&self) -> &[Arc<dyn ToolAdapter>] {
        &self.adapters
    }

    /// Gateway with every adapter registered and the configured policies.
    pub fn into_gateway(
        self,
        config: &FileConfig,
        logger: Arc<dyn RunEventLogger>,
    ) -> ToolGateway {
        let gateway = self.adapters.into_iter().fold(
            ToolGateway::new(config.to_run_params()).with_logger(logger),
            |gateway, adapter| {
                debug!(tool = adapter.name(), "Registered tool adapter");
                gateway.with_adapter(adapter)
            },
        );

        let missing: Vec<&str> = crew_domain::tool::entities::ALL_TOOLS
            .into_iter()
            .filter(|name| !gateway.has_tool(name))
            .collect();
        if !missing.is_empty() {
            warn!("No adapter configured for: {}", missing.join(", "));
        }
        gateway
    }
}
