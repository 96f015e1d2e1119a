//! Success payloads produced by each specialist worker

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the scribe's narrative text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    /// Transcribed from the consultation audio
    Audio,
    /// Taken verbatim from the clinical notes
    Notes,
}

/// One extracted condition and the canonical code it mapped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedEntry {
    /// Condition or symptom term as extracted
    pub condition: String,
    /// ICD-11 code, `None` when the lookup found no match
    #[serde(rename = "icd11_code", default)]
    pub code: Option<String>,
    /// Code title, or the lookup error when unmapped
    #[serde(default)]
    pub description: String,
}

impl CodedEntry {
    pub fn is_mapped(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// One labeled drug option for a coded condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentOption {
    pub drug_name: String,
    pub purpose: String,
    pub warnings: String,
    pub route: Vec<String>,
}

/// Labeled treatment options looked up for one coded condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentSuggestion {
    pub condition: String,
    pub icd_code: String,
    pub treatments: Vec<TreatmentOption>,
    /// Label source, e.g. "openFDA"
    pub source: String,
}

/// Transcription-and-coding worker output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScribeReport {
    pub transcript_or_notes: String,
    pub source: NarrativeSource,
    pub chief_complaint: String,
    pub extracted_terms: Vec<String>,
    #[serde(default)]
    pub vitals: BTreeMap<String, serde_json::Value>,
    pub coded_entries: Vec<CodedEntry>,
    pub mapped_count: usize,
    /// 0.0–1.0
    pub confidence: f64,
    /// Options for the mapped conditions; empty when the lookup was skipped
    /// or failed
    #[serde(default)]
    pub treatments: Vec<TreatmentSuggestion>,
    /// Why no treatment options were looked up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_note: Option<String>,
}

/// Imaging analysis worker output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagingReport {
    pub image_type: String,
    pub findings: Vec<String>,
    pub anatomical_region: String,
    pub severity: String,
    /// 0.0–1.0
    pub confidence: f64,
}

impl ImagingReport {
    /// Findings other than the "nothing found" placeholder.
    pub fn significant_findings(&self) -> impl Iterator<Item = &str> {
        self.findings
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("no significant findings"))
    }
}

/// History retrieval worker output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub risk_flags: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub interaction_warnings: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
}

/// Tagged success payload of any worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "worker", rename_all = "lowercase")]
pub enum WorkerReport {
    Scribe(ScribeReport),
    Radiology(ImagingReport),
    Records(HistoryReport),
}

impl WorkerReport {
    pub fn kind(&self) -> super::WorkerKind {
        match self {
            WorkerReport::Scribe(_) => super::WorkerKind::Scribe,
            WorkerReport::Radiology(_) => super::WorkerKind::Radiology,
            WorkerReport::Records(_) => super::WorkerKind::Records,
        }
    }

    /// The inner report as JSON, without the `worker` tag.
    ///
    /// This is the value folded into the context under `<ns>.report`.
    pub fn to_context_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            WorkerReport::Scribe(r) => serde_json::to_value(r),
            WorkerReport::Radiology(r) => serde_json::to_value(r),
            WorkerReport::Records(r) => serde_json::to_value(r),
        }
    }
}
