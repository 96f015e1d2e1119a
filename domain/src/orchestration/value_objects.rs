//! Fan-in bookkeeping and the synthesis view of a finished run

use super::entities::OrchestrationError;
use crate::context::ContextSnapshot;
use crate::intake::keys;
use crate::worker::{
    HistoryReport, ImagingReport, ScribeReport, WorkerFailure, WorkerKind, WorkerResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Results collected during fan-in, keyed by worker.
///
/// Arrival order is irrelevant; each worker has exactly one slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FanInRecord {
    results: BTreeMap<WorkerKind, WorkerResult>,
}

impl FanInRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, rejecting a second one for the same worker.
    pub fn record(&mut self, result: WorkerResult) -> Result<(), OrchestrationError> {
        if self.results.contains_key(&result.worker) {
            return Err(OrchestrationError::DuplicateResult(result.worker));
        }
        self.results.insert(result.worker, result);
        Ok(())
    }

    pub fn get(&self, worker: WorkerKind) -> Option<&WorkerResult> {
        self.results.get(&worker)
    }

    pub fn contains(&self, worker: WorkerKind) -> bool {
        self.results.contains_key(&worker)
    }

    /// Workers that have not reported yet.
    pub fn missing(&self) -> Vec<WorkerKind> {
        WorkerKind::ALL
            .into_iter()
            .filter(|kind| !self.results.contains_key(kind))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Fails with `Incomplete` unless every worker has a slot.
    pub fn ensure_complete(&self) -> Result<(), OrchestrationError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OrchestrationError::Incomplete(missing))
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &WorkerResult> {
        self.results.values()
    }

    pub fn successes(&self) -> impl Iterator<Item = &WorkerResult> {
        self.results.values().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = (WorkerKind, &WorkerFailure)> {
        self.results
            .values()
            .filter_map(|r| r.failure_info().map(|f| (r.worker, f)))
    }

    /// Failure descriptors keyed by worker.
    pub fn gaps(&self) -> BTreeMap<WorkerKind, WorkerFailure> {
        self.failures().map(|(k, f)| (k, f.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<WorkerResult> {
        self.results.into_values().collect()
    }
}

/// What synthesis reads: the three namespaced reports (each possibly
/// absent) and the failure behind every absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespacedResults {
    pub subject_id: Option<String>,
    pub scribe: Option<ScribeReport>,
    pub radiology: Option<ImagingReport>,
    pub records: Option<HistoryReport>,
    pub gaps: BTreeMap<WorkerKind, WorkerFailure>,
}

impl NamespacedResults {
    /// Read each worker's `<ns>.report` key back out of the context.
    ///
    /// A report that is present but does not decode is treated as absent;
    /// a gap is recorded for it if none was supplied.
    pub fn from_context(
        snapshot: &ContextSnapshot,
        gaps: BTreeMap<WorkerKind, WorkerFailure>,
    ) -> Self {
        fn decode<T: serde::de::DeserializeOwned>(
            snapshot: &ContextSnapshot,
            worker: WorkerKind,
        ) -> Option<T> {
            snapshot
                .get(&worker.report_key())
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }

        let mut results = Self {
            subject_id: snapshot.text(keys::SUBJECT_ID).map(str::to_string),
            scribe: decode(snapshot, WorkerKind::Scribe),
            radiology: decode(snapshot, WorkerKind::Radiology),
            records: decode(snapshot, WorkerKind::Records),
            gaps,
        };

        for worker in WorkerKind::ALL {
            if !results.has(worker) && !results.gaps.contains_key(&worker) {
                results.gaps.insert(
                    worker,
                    WorkerFailure::new(
                        crate::worker::FailureKind::ToolPermanent,
                        format!("no report found under '{}'", worker.report_key()),
                    ),
                );
            }
        }
        results
    }

    /// Whether `worker` produced evidence.
    pub fn has(&self, worker: WorkerKind) -> bool {
        match worker {
            WorkerKind::Scribe => self.scribe.is_some(),
            WorkerKind::Radiology => self.radiology.is_some(),
            WorkerKind::Records => self.records.is_some(),
        }
    }

    pub fn available(&self) -> Vec<WorkerKind> {
        WorkerKind::ALL.into_iter().filter(|w| self.has(*w)).collect()
    }

    pub fn unavailable(&self) -> Vec<WorkerKind> {
        WorkerKind::ALL.into_iter().filter(|w| !self.has(*w)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextStore, Writer};
    use crate::worker::{FailureKind, WorkerReport};
    use serde_json::json;

    fn history() -> HistoryReport {
        HistoryReport {
            risk_flags: vec!["Type 2 diabetes".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_record_rejects_duplicates() {
        let mut record = FanInRecord::new();
        record
            .record(WorkerResult::success(WorkerReport::Records(history()), 5))
            .unwrap();
        let err = record
            .record(WorkerResult::failure(
                WorkerKind::Records,
                WorkerFailure::timeout("late"),
                9,
            ))
            .unwrap_err();
        assert_eq!(err, OrchestrationError::DuplicateResult(WorkerKind::Records));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_completeness() {
        let mut record = FanInRecord::new();
        assert_eq!(record.missing(), WorkerKind::ALL.to_vec());

        record
            .record(WorkerResult::failure(
                WorkerKind::Scribe,
                WorkerFailure::insufficient_input("no audio or notes"),
                0,
            ))
            .unwrap();
        record
            .record(WorkerResult::success(WorkerReport::Records(history()), 3))
            .unwrap();
        assert!(matches!(
            record.ensure_complete(),
            Err(OrchestrationError::Incomplete(ref m)) if m == &vec![WorkerKind::Radiology]
        ));

        record
            .record(WorkerResult::failure(
                WorkerKind::Radiology,
                WorkerFailure::timeout("deadline"),
                100,
            ))
            .unwrap();
        assert!(record.is_complete());
        assert_eq!(record.successes().count(), 1);
        assert_eq!(record.gaps().len(), 2);
    }

    #[test]
    fn test_from_context_reads_namespaced_reports() {
        let mut store = ContextStore::new();
        store
            .set(Writer::Bootstrap, keys::SUBJECT_ID, json!("pt-42"))
            .unwrap();
        store.seal_inputs();
        store
            .set(
                Writer::Worker(WorkerKind::Records),
                WorkerKind::Records.report_key(),
                serde_json::to_value(history()).unwrap(),
            )
            .unwrap();

        let gaps = BTreeMap::from([(
            WorkerKind::Scribe,
            WorkerFailure::insufficient_input("no audio or notes"),
        )]);
        let results = NamespacedResults::from_context(&store.snapshot(), gaps);

        assert_eq!(results.subject_id.as_deref(), Some("pt-42"));
        assert_eq!(results.records, Some(history()));
        assert_eq!(results.available(), vec![WorkerKind::Records]);
        assert_eq!(
            results.gaps[&WorkerKind::Scribe].kind,
            FailureKind::InsufficientInput
        );
        // No gap was supplied for radiology, one is synthesized
        assert!(results.gaps.contains_key(&WorkerKind::Radiology));
    }
}
