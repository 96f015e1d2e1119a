//! Synthesis and submission driver
//!
//! Builds the decision from the namespaced results (pure) and hands it to
//! the decision sink through the gateway, once per call.

use crate::gateway::ToolGateway;
use crate::ports::run_logger::{NoRunEventLogger, RunEvent, RunEventLogger};
use chrono::Utc;
use crew_domain::tool::entities::SUBMIT_DECISION;
use crew_domain::tool::payloads::{SubmissionAck, SubmitArgs};
use crew_domain::{
    NamespacedResults, SubmissionReceipt, SynthesisError, SynthesizedDecision, ToolError,
    ToolErrorKind, synthesize,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Submission did not produce an accepted receipt.
///
/// The decision is carried back so the caller can
/// [`SubmissionDriver::resubmit`] later without recomputing it.
#[derive(Error, Debug)]
#[error("Submission failed: {source}")]
pub struct SubmissionFailed {
    pub decision: Box<SynthesizedDecision>,
    #[source]
    pub source: ToolError,
}

pub struct SubmissionDriver {
    gateway: Arc<ToolGateway>,
    logger: Arc<dyn RunEventLogger>,
}

impl SubmissionDriver {
    pub fn new(gateway: Arc<ToolGateway>) -> Self {
        Self {
            gateway,
            logger: Arc::new(NoRunEventLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Synthesize the decision and log it.
    pub fn decide(
        &self,
        results: &NamespacedResults,
    ) -> Result<SynthesizedDecision, SynthesisError> {
        let decision = synthesize(results)?;
        info!(
            confidence = %decision.confidence_level,
            codes = decision.classifications.len(),
            unavailable = decision.unavailable.len(),
            "Decision synthesized: {}",
            decision.hypothesis
        );
        self.logger.log(RunEvent::new(
            "decision",
            serde_json::to_value(&decision).unwrap_or_else(|e| json!({ "error": e.to_string() })),
        ));
        Ok(decision)
    }

    /// Submit `decision` for `subject_id`. One gateway invocation; the
    /// gateway retries transient failures per the `submit_decision` policy.
    pub async fn submit(
        &self,
        subject_id: Option<&str>,
        decision: SynthesizedDecision,
    ) -> Result<SubmissionReceipt, SubmissionFailed> {
        let payload = match serde_json::to_value(&decision) {
            Ok(payload) => payload,
            Err(e) => {
                return Err(SubmissionFailed {
                    decision: Box::new(decision),
                    source: ToolError::invalid_input(SUBMIT_DECISION, e.to_string()),
                });
            }
        };
        let args = SubmitArgs {
            subject_id: subject_id.unwrap_or_default().to_string(),
            icd_codes: decision.icd_codes(),
            clinical_summary: decision.clinical_summary(),
            decision: payload,
        };

        let outcome = self
            .gateway
            .invoke_typed::<_, SubmissionAck>(SUBMIT_DECISION, &args)
            .await
            .and_then(|ack| {
                let receipt = SubmissionReceipt::from_ack(
                    Some(&ack.status),
                    ack.id,
                    ack.timestamp.as_deref(),
                    Utc::now(),
                );
                if receipt.is_ok() {
                    Ok(receipt)
                } else {
                    Err(ToolError::new(
                        SUBMIT_DECISION,
                        ToolErrorKind::Rejected,
                        format!("decision sink answered with status '{}'", receipt.status),
                    ))
                }
            });

        match outcome {
            Ok(receipt) => {
                info!(id = %receipt.id, status = %receipt.status, "Decision submitted");
                self.logger.log(RunEvent::new(
                    "submission",
                    json!({
                        "status": receipt.status,
                        "id": receipt.id,
                        "timestamp": receipt.timestamp.to_rfc3339(),
                    }),
                ));
                Ok(receipt)
            }
            Err(source) => {
                warn!("Decision submission failed: {}", source);
                self.logger.log(RunEvent::new(
                    "submission_failed",
                    json!({ "error": source.to_string(), "kind": source.kind.as_str() }),
                ));
                Err(SubmissionFailed {
                    decision: Box::new(decision),
                    source,
                })
            }
        }
    }

    /// Retry a previously failed submission with the same decision.
    pub async fn resubmit(
        &self,
        subject_id: Option<&str>,
        failed: SubmissionFailed,
    ) -> Result<SubmissionReceipt, SubmissionFailed> {
        info!("Resubmitting decision after: {}", failed.source);
        self.submit(subject_id, *failed.decision).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubTool, fast_params, gateway};
    use crew_domain::{HistoryReport, WorkerFailure, WorkerKind};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn results() -> NamespacedResults {
        NamespacedResults {
            subject_id: Some("pt-42".to_string()),
            records: Some(HistoryReport {
                risk_flags: vec!["smoker".to_string()],
                ..Default::default()
            }),
            gaps: BTreeMap::from([
                (WorkerKind::Scribe, WorkerFailure::insufficient_input("none")),
                (WorkerKind::Radiology, WorkerFailure::timeout("deadline")),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_once_and_receipt() {
        let sink = Arc::new(StubTool::returning(
            SUBMIT_DECISION,
            json!({ "diagnosis_id": "dx-1", "timestamp": "2026-05-01T12:00:00Z" }),
        ));
        let driver = SubmissionDriver::new(gateway(fast_params(), &[sink.clone()]));

        let decision = driver.decide(&results()).unwrap();
        let receipt = driver.submit(Some("pt-42"), decision).await.unwrap();

        assert_eq!(sink.calls(), 1);
        assert_eq!(receipt.status, "ok");
        assert_eq!(receipt.id, "dx-1");
        let args = sink.last_arguments().unwrap();
        assert_eq!(args["subject_id"], "pt-42");
        assert_eq!(args["icd_codes"], json!([]));
        assert!(
            args["clinical_summary"]
                .as_str()
                .unwrap()
                .contains("scribe evidence unavailable")
        );
    }

    #[tokio::test]
    async fn test_exhausted_retries_carry_decision_and_resubmit() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let sink = Arc::new(StubTool::new(SUBMIT_DECISION, move |_: &Value| {
            // First three attempts (one call with two retries) fail
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(ToolError::new(SUBMIT_DECISION, ToolErrorKind::Unavailable, "503"))
            } else {
                Ok(json!({ "status": "ok", "id": "dx-9" }))
            }
        }));
        let driver = SubmissionDriver::new(gateway(fast_params(), &[sink.clone()]));
        let decision = driver.decide(&results()).unwrap();

        let failed = driver
            .submit(Some("pt-42"), decision.clone())
            .await
            .unwrap_err();
        assert_eq!(failed.source.kind, ToolErrorKind::Unavailable);
        assert_eq!(*failed.decision, decision);
        assert_eq!(sink.calls(), 3);

        let receipt = driver.resubmit(Some("pt-42"), failed).await.unwrap();
        assert_eq!(receipt.id, "dx-9");
        assert_eq!(sink.calls(), 4);
    }

    #[tokio::test]
    async fn test_rejected_status_is_failure() {
        let sink = Arc::new(StubTool::returning(
            SUBMIT_DECISION,
            json!({ "status": "rejected", "id": "" }),
        ));
        let driver = SubmissionDriver::new(gateway(fast_params(), &[sink.clone()]));
        let decision = driver.decide(&results()).unwrap();

        let failed = driver.submit(Some("pt-42"), decision).await.unwrap_err();

        assert_eq!(failed.source.kind, ToolErrorKind::Rejected);
        assert_eq!(sink.calls(), 1);
    }
}
