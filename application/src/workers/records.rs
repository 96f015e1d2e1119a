//! History retrieval worker

use super::{SpecialistWorker, WorkerAssignment};
use crate::gateway::ToolGateway;
use async_trait::async_trait;
use crew_domain::intake::keys;
use crew_domain::tool::entities::RETRIEVE_HISTORY;
use crew_domain::tool::payloads::{HistoryArgs, HistoryRecord};
use crew_domain::{HistoryReport, WorkerFailure, WorkerKind, WorkerReport};
use std::sync::Arc;

pub struct RecordsWorker {
    gateway: Arc<ToolGateway>,
}

impl RecordsWorker {
    pub fn new(gateway: Arc<ToolGateway>) -> Self {
        Self { gateway }
    }
}

fn cleaned(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[async_trait]
impl SpecialistWorker for RecordsWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Records
    }

    async fn produce(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerFailure> {
        let subject_id = assignment
            .snapshot
            .text(keys::SUBJECT_ID)
            .ok_or_else(|| WorkerFailure::insufficient_input("subject_id is not present"))?;

        let record: HistoryRecord = self
            .gateway
            .invoke_typed(
                RETRIEVE_HISTORY,
                &HistoryArgs {
                    subject_id: subject_id.to_string(),
                    instruction: assignment.instruction.clone(),
                },
            )
            .await?;

        Ok(WorkerReport::Records(HistoryReport {
            risk_flags: cleaned(record.risk_flags),
            chronic_conditions: cleaned(record.chronic_conditions),
            interaction_warnings: cleaned(record.interaction_warnings),
            allergies: cleaned(record.allergies),
            medications: cleaned(record.medications),
        }))
    }
}
