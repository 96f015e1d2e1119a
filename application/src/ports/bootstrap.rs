//! Context bootstrap port
//!
//! Looks up what the backend already knows about a subject before the run
//! starts: modality references and any clinical notes on file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while fetching the initial context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("Subject not found: {0}")]
    NotFound(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed bootstrap response: {0}")]
    Malformed(String),
}

/// Input values known to the backend for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContext {
    pub audio_ref: Option<String>,
    pub image_ref: Option<String>,
    pub clinical_notes: Option<String>,
}

/// Port for fetching the initial context of a run.
#[async_trait]
pub trait ContextBootstrapPort: Send + Sync {
    async fn fetch_initial_context(&self, subject_id: &str)
    -> Result<InitialContext, BootstrapError>;
}

/// Bootstrap that knows nothing; the request alone populates the context.
pub struct NoBootstrap;

#[async_trait]
impl ContextBootstrapPort for NoBootstrap {
    async fn fetch_initial_context(
        &self,
        _subject_id: &str,
    ) -> Result<InitialContext, BootstrapError> {
        Ok(InitialContext::default())
    }
}
