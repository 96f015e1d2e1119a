//! Imaging analysis worker

use super::{SpecialistWorker, WorkerAssignment};
use crate::gateway::ToolGateway;
use async_trait::async_trait;
use crew_domain::intake::keys;
use crew_domain::tool::entities::ANALYZE_RADIOLOGY;
use crew_domain::tool::payloads::{AnalyzeImageArgs, ImagingFindings, normalize_confidence};
use crew_domain::{ImagingReport, WorkerFailure, WorkerKind, WorkerReport};
use std::sync::Arc;

const NO_FINDINGS: &str = "No significant findings";

pub struct RadiologyWorker {
    gateway: Arc<ToolGateway>,
}

impl RadiologyWorker {
    pub fn new(gateway: Arc<ToolGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl SpecialistWorker for RadiologyWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Radiology
    }

    async fn produce(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerFailure> {
        let image_ref = assignment
            .snapshot
            .text(keys::IMAGE_REF)
            .ok_or_else(|| WorkerFailure::insufficient_input("image_ref is not present"))?;

        let output: ImagingFindings = self
            .gateway
            .invoke_typed(
                ANALYZE_RADIOLOGY,
                &AnalyzeImageArgs {
                    image_ref: image_ref.to_string(),
                    instruction: assignment.instruction.clone(),
                },
            )
            .await?;

        let mut findings: Vec<String> = output
            .findings
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if findings.is_empty() {
            findings.push(NO_FINDINGS.to_string());
        }

        Ok(WorkerReport::Radiology(ImagingReport {
            image_type: output.image_type,
            findings,
            anatomical_region: output.anatomical_region,
            severity: output.severity.to_lowercase(),
            confidence: normalize_confidence(output.confidence),
        }))
    }
}
