//! Synthesized decision and submission receipt

use crate::worker::{FailureKind, TreatmentSuggestion, WorkerKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Attached to every decision.
pub const DISCLAIMER: &str = "AI-assisted decision support only. For clinician review, not a \
     prescription. All clinical decisions require licensed clinician review.";

/// Attached to every treatment plan.
pub const TREATMENT_DISCLAIMER: &str = "For clinician review, not a prescription. FDA-labeled \
     indications for information only; treatment decisions rest with a licensed clinician.";

/// Overall confidence in the preliminary assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    /// Grade from the number of evidence sources and their mean confidence.
    ///
    /// - High: at least two sources and mean >= 0.75
    /// - Moderate: at least two sources, or mean >= 0.5
    /// - Low: otherwise
    pub fn grade(sources: usize, mean_confidence: f64) -> Self {
        if sources >= 2 && mean_confidence >= 0.75 {
            ConfidenceLevel::High
        } else if sources >= 2 || mean_confidence >= 0.5 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Moderate => "Moderate",
            ConfidenceLevel::High => "High",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mapped ICD-11 classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub code: String,
    pub title: String,
    /// Term it was mapped from
    pub condition: String,
}

/// Structured medical-record entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub subject_id: Option<String>,
    pub presenting_complaint: String,
    pub findings: Vec<String>,
    pub history: Vec<String>,
    pub risk_flags: Vec<String>,
    /// Specialist reports that disagree with each other
    #[serde(default)]
    pub contradictions: Vec<String>,
    pub assessment: String,
}

/// An evidence source that contributed nothing, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceGap {
    pub source: WorkerKind,
    pub kind: FailureKind,
    pub reason: String,
}

impl std::fmt::Display for EvidenceGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}: {})", self.source, self.kind, self.reason)
    }
}

/// Labeled treatment options for the coded conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    /// One per ICD-11 code, sorted by code
    pub suggestions: Vec<TreatmentSuggestion>,
    pub disclaimer: String,
}

/// The combined assessment built from whatever evidence survived fan-in.
///
/// Immutable once built. Carries no timestamps so that synthesizing the
/// same results twice yields an equal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedDecision {
    pub hypothesis: String,
    pub confidence_level: ConfidenceLevel,
    pub classifications: Vec<Classification>,
    pub record_entry: RecordEntry,
    pub patient_summary: String,
    pub risk_flags: Vec<String>,
    /// Disagreements between specialist reports; caps confidence at Moderate
    pub contradictions: Vec<String>,
    /// `None` when no coded condition has labeled options
    pub suggested_treatments: Option<TreatmentPlan>,
    pub unavailable: Vec<EvidenceGap>,
    /// e.g. "scribe evidence unavailable"
    pub evidence_flags: Vec<String>,
    pub disclaimer: String,
}

impl SynthesizedDecision {
    pub fn icd_codes(&self) -> Vec<String> {
        self.classifications.iter().map(|c| c.code.clone()).collect()
    }

    /// Whether the decision carries `flag` (exact match).
    pub fn has_flag(&self, flag: &str) -> bool {
        self.evidence_flags.iter().any(|f| f == flag)
    }

    /// Sources that produced evidence.
    pub fn available_sources(&self) -> Vec<WorkerKind> {
        WorkerKind::ALL
            .into_iter()
            .filter(|w| !self.unavailable.iter().any(|g| g.source == *w))
            .collect()
    }

    /// Clinician-facing text sent with the submission.
    pub fn clinical_summary(&self) -> String {
        let mut out = String::new();
        for contradiction in &self.contradictions {
            let _ = writeln!(out, "CONTRADICTION: {}", contradiction);
        }
        let _ = writeln!(out, "PRELIMINARY ASSESSMENT: {}", self.hypothesis);
        let _ = writeln!(out, "Confidence: {}", self.confidence_level);

        if !self.classifications.is_empty() {
            let _ = writeln!(out, "ICD-11 CODES:");
            for c in &self.classifications {
                let _ = writeln!(out, "  [{}] {} ({})", c.code, c.title, c.condition);
            }
        }
        if !self.risk_flags.is_empty() {
            let _ = writeln!(out, "RISK FLAGS: {}", self.risk_flags.join("; "));
        }
        if let Some(plan) = &self.suggested_treatments {
            let _ = writeln!(out, "SUGGESTED TREATMENTS (for clinician review only):");
            for suggestion in &plan.suggestions {
                let drugs: Vec<&str> = suggestion
                    .treatments
                    .iter()
                    .map(|t| t.drug_name.as_str())
                    .collect();
                let _ = writeln!(
                    out,
                    "  [{}] {}: {}",
                    suggestion.icd_code,
                    suggestion.condition,
                    drugs.join(", ")
                );
            }
            let _ = writeln!(out, "  {}", plan.disclaimer);
        }
        for flag in &self.evidence_flags {
            let _ = writeln!(out, "NOTE: {}", flag);
        }
        let _ = write!(out, "{}", self.disclaimer);
        out
    }
}

/// Acknowledgement of a successful submission; the terminal artifact of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub status: String,
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl SubmissionReceipt {
    /// Build a receipt from the raw acknowledgement fields.
    ///
    /// A missing status means the sink accepted without saying so (`ok`);
    /// a missing or unparseable timestamp falls back to `received_at`.
    pub fn from_ack(
        status: Option<&str>,
        id: impl Into<String>,
        timestamp: Option<&str>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("ok")
            .to_lowercase();
        let timestamp = timestamp
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(received_at);
        Self {
            status,
            id: id.into(),
            timestamp,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "success" | "accepted" | "created")
    }
}
