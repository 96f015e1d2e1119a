//! Run Intake use case
//!
//! Orchestrates one full intake run:
//!
//! ```text
//! bootstrap ──▶ seal ──▶ coordinate (fan-out / fan-in) ──▶ synthesize ──▶ submit
//! ```

use super::coordinate_crew::{CoordinateError, CrewCoordinator};
use super::submit_decision::{SubmissionDriver, SubmissionFailed};
use crate::gateway::ToolGateway;
use crate::ports::bootstrap::{BootstrapError, ContextBootstrapPort, InitialContext};
use crate::ports::progress::{NoProgress, RunProgressNotifier};
use crate::ports::run_logger::{NoRunEventLogger, RunEvent, RunEventLogger};
use crew_domain::intake::keys;
use crew_domain::{
    ContextError, ContextStore, EvidenceGap, NamespacedResults, OrchestrationRequest,
    SubmissionReceipt, SynthesisError, SynthesizedDecision, ToolError, WorkerKind, WorkerResult,
    Writer,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that end a run. Per-worker failures never appear here; they are
/// recorded as gaps on the decision.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Bootstrap failed: {0}")]
    BootstrapFailed(#[from] BootstrapError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient evidence: every worker failed")]
    InsufficientEvidence { gaps: Vec<EvidenceGap> },

    #[error("Submission failed: {source}")]
    SubmissionFailed {
        decision: Box<SynthesizedDecision>,
        #[source]
        source: ToolError,
    },

    #[error("Coordination failed: {0}")]
    Coordination(CoordinateError),
}

impl RunError {
    /// The decision built before submission failed, if any.
    pub fn decision(&self) -> Option<&SynthesizedDecision> {
        match self {
            RunError::SubmissionFailed { decision, .. } => Some(decision),
            _ => None,
        }
    }
}

impl From<CoordinateError> for RunError {
    fn from(error: CoordinateError) -> Self {
        match error {
            CoordinateError::Configuration { .. } => RunError::Configuration(error.to_string()),
            other => RunError::Coordination(other),
        }
    }
}

impl From<SynthesisError> for RunError {
    fn from(error: SynthesisError) -> Self {
        match error {
            SynthesisError::InsufficientEvidence { gaps } => {
                RunError::InsufficientEvidence { gaps }
            }
        }
    }
}

impl From<SubmissionFailed> for RunError {
    fn from(failed: SubmissionFailed) -> Self {
        RunError::SubmissionFailed {
            decision: failed.decision,
            source: failed.source,
        }
    }
}

impl From<ContextError> for RunError {
    fn from(error: ContextError) -> Self {
        RunError::Coordination(CoordinateError::Context(error))
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunIntakeOutput {
    pub receipt: SubmissionReceipt,
    pub decision: SynthesizedDecision,
    /// One per worker, in roster order
    pub results: Vec<WorkerResult>,
}

/// Use case for running one intake orchestration
pub struct RunIntakeUseCase {
    bootstrap: Arc<dyn ContextBootstrapPort>,
    gateway: Arc<ToolGateway>,
    logger: Arc<dyn RunEventLogger>,
    cancellation: Option<CancellationToken>,
    bootstrap_timeout: Duration,
}

impl RunIntakeUseCase {
    pub fn new(bootstrap: Arc<dyn ContextBootstrapPort>, gateway: Arc<ToolGateway>) -> Self {
        Self {
            bootstrap,
            gateway,
            logger: Arc::new(NoRunEventLogger),
            cancellation: None,
            bootstrap_timeout: DEFAULT_BOOTSTRAP_TIMEOUT,
        }
    }

    /// Upper bound on the bootstrap call, whatever the adapter does.
    pub fn with_bootstrap_timeout(mut self, timeout: Duration) -> Self {
        self.bootstrap_timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Driver sharing this use case's gateway and logger, for resubmission.
    pub fn submission_driver(&self) -> SubmissionDriver {
        SubmissionDriver::new(Arc::clone(&self.gateway)).with_logger(Arc::clone(&self.logger))
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        request: OrchestrationRequest,
    ) -> Result<RunIntakeOutput, RunError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: OrchestrationRequest,
        progress: &dyn RunProgressNotifier,
    ) -> Result<RunIntakeOutput, RunError> {
        info!(
            subject = request.subject_id().unwrap_or("<none>"),
            "Starting intake run"
        );

        let mut store = self.bootstrap_context(&request).await?;

        let mut coordinator =
            CrewCoordinator::standard(Arc::clone(&self.gateway))
                .with_logger(Arc::clone(&self.logger));
        if let Some(token) = &self.cancellation {
            coordinator = coordinator.with_cancellation(token.clone());
        }
        let record = coordinator
            .coordinate(&mut store, &self.gateway.params().instructions, progress)
            .await?;

        let results = NamespacedResults::from_context(&store.snapshot(), record.gaps());
        let driver = self.submission_driver();
        let decision = match driver.decide(&results) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("{}", e);
                self.logger.log(RunEvent::new(
                    "insufficient_evidence",
                    json!({ "gaps": e.to_string() }),
                ));
                return Err(e.into());
            }
        };
        progress.on_decision(&decision);

        let receipt = driver
            .submit(results.subject_id.as_deref(), decision.clone())
            .await?;
        progress.on_submitted(&receipt);

        info!(id = %receipt.id, "Intake run complete");
        Ok(RunIntakeOutput {
            receipt,
            decision,
            results: record.into_results(),
        })
    }

    /// Ask the bootstrap port, giving up on timeout or cancellation.
    async fn fetch_initial_context(
        &self,
        subject_id: &str,
    ) -> Result<InitialContext, BootstrapError> {
        let fetch = tokio::time::timeout(
            self.bootstrap_timeout,
            self.bootstrap.fetch_initial_context(subject_id),
        );
        let outcome = match &self.cancellation {
            Some(token) => tokio::select! {
                outcome = fetch => outcome,
                _ = token.cancelled() => {
                    return Err(BootstrapError::Unavailable(
                        "run cancelled during bootstrap".to_string(),
                    ));
                }
            },
            None => fetch.await,
        };
        outcome.map_err(|_| {
            BootstrapError::Unavailable(format!(
                "no answer within {}ms",
                self.bootstrap_timeout.as_millis()
            ))
        })?
    }

    /// Fill and seal the input keys.
    ///
    /// With a subject id the backend is asked for what it knows; request
    /// fields win over bootstrap values. Every input key is written, as JSON
    /// null when absent, so templates can always resolve it.
    async fn bootstrap_context(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<ContextStore, RunError> {
        let initial = match request.subject_id() {
            Some(subject_id) => self.fetch_initial_context(subject_id).await?,
            None => {
                info!("No subject id supplied; skipping backend bootstrap");
                InitialContext::default()
            }
        };

        let text = |value: Option<&str>| {
            value
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null)
        };
        let inputs = [
            (keys::SUBJECT_ID, text(request.subject_id())),
            (
                keys::AUDIO_REF,
                text(request.audio_ref().or(initial.audio_ref.as_deref())),
            ),
            (
                keys::IMAGE_REF,
                text(request.image_ref().or(initial.image_ref.as_deref())),
            ),
            (
                keys::CLINICAL_NOTES,
                text(request.notes().or(initial.clinical_notes.as_deref())),
            ),
        ];

        let mut store = ContextStore::new();
        for (key, value) in inputs {
            store.set(Writer::Bootstrap, key, value)?;
        }
        store.seal_inputs();

        let snapshot = store.snapshot();
        let present: Vec<&str> = keys::INPUT_KEYS
            .into_iter()
            .filter(|k| snapshot.text(k).is_some())
            .collect();
        info!("Context bootstrapped with inputs: {:?}", present);
        self.logger.log(RunEvent::new(
            "bootstrap",
            json!({
                "subject_id": request.subject_id(),
                "present": present,
                "workers": WorkerKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            }),
        ));
        Ok(store)
    }
}
