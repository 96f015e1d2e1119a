//! Typed arguments and outputs for every tool
//!
//! Output types default every field so that a service omitting a field
//! still decodes; a payload that is not a JSON object at all is rejected by
//! the gateway as malformed output.

use crate::worker::reports::{CodedEntry, TreatmentSuggestion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest raw confidence read as a percentage rather than a fraction.
pub const PERCENT_FLOOR: f64 = 2.0;

/// Clamp a reported confidence into `0.0..=1.0`.
///
/// Services report either a fraction (`0.0..=1.0`) or a percentage
/// (`0..=100`). Values from [`PERCENT_FLOOR`] up are divided by 100; values
/// just above 1.0 are fractions that overshot and clamp to 1.0.
pub fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        0.0
    } else if raw >= PERCENT_FLOOR {
        (raw / 100.0).min(1.0)
    } else {
        raw.min(1.0)
    }
}

// ==================== transcribe_audio ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeArgs {
    pub audio_ref: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transcription {
    pub transcript: String,
    /// Fraction or percentage, see [`normalize_confidence`]
    pub confidence: f64,
    pub duration_seconds: f64,
}

// ==================== analyze_clinical_notes ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeNotesArgs {
    pub text: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalExtraction {
    pub chief_complaint: String,
    pub symptoms: Vec<String>,
    pub vitals: BTreeMap<String, serde_json::Value>,
    pub mentioned_medications: Vec<String>,
    /// Fraction or percentage, see [`normalize_confidence`]
    pub confidence: f64,
}

impl ClinicalExtraction {
    /// Condition terms to code: every symptom, plus the chief complaint when
    /// it is not already listed. Order preserved, case-insensitive dedup.
    pub fn condition_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let candidates = self
            .symptoms
            .iter()
            .chain(std::iter::once(&self.chief_complaint));
        for candidate in candidates {
            let term = candidate.trim();
            if term.is_empty() {
                continue;
            }
            if !terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
                terms.push(term.to_string());
            }
        }
        terms
    }
}

// ==================== map_icd_codes ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapCodesArgs {
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeMapping {
    pub codes: Vec<CodedEntry>,
    pub mapped_count: usize,
}

// ==================== suggest_treatments ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentQuery {
    pub condition: String,
    pub icd_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestTreatmentsArgs {
    pub conditions: Vec<TreatmentQuery>,
}

impl SuggestTreatmentsArgs {
    /// One query per mapped entry, in mapping order.
    pub fn for_mapped(entries: &[CodedEntry]) -> Self {
        let conditions = entries
            .iter()
            .filter(|e| e.is_mapped())
            .filter_map(|e| {
                Some(TreatmentQuery {
                    condition: e.condition.trim().to_string(),
                    icd_code: e.code.as_deref()?.trim().to_string(),
                })
            })
            .collect();
        Self { conditions }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentLookup {
    #[serde(alias = "treatment_plan")]
    pub suggestions: Vec<TreatmentSuggestion>,
}

// ==================== analyze_radiology ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeImageArgs {
    pub image_ref: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingFindings {
    pub image_type: String,
    pub findings: Vec<String>,
    pub anatomical_region: String,
    pub severity: String,
    /// Fraction or percentage, see [`normalize_confidence`]
    pub confidence: f64,
}

impl Default for ImagingFindings {
    fn default() -> Self {
        Self {
            image_type: "unknown".to_string(),
            findings: Vec::new(),
            anatomical_region: "unknown".to_string(),
            severity: "unknown".to_string(),
            confidence: 0.0,
        }
    }
}

// ==================== retrieve_history ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryArgs {
    pub subject_id: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryRecord {
    #[serde(alias = "riskFlags")]
    pub risk_flags: Vec<String>,
    #[serde(alias = "chronicConditions", alias = "conditions")]
    pub chronic_conditions: Vec<String>,
    #[serde(alias = "interactions")]
    pub interaction_warnings: Vec<String>,
    pub allergies: Vec<String>,
    pub medications: Vec<String>,
}

// ==================== submit_decision ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitArgs {
    pub subject_id: String,
    pub icd_codes: Vec<String>,
    pub clinical_summary: String,
    pub decision: serde_json::Value,
}

/// Raw acknowledgement from the record store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionAck {
    pub status: String,
    #[serde(alias = "diagnosis_id")]
    pub id: String,
    pub timestamp: Option<String>,
}

// ==================== text output ====================

/// Parse tool output that arrived as text.
///
/// Accepts a bare JSON document or one wrapped in a ` ```json ` (or plain
/// ` ``` `) fenced block, as inference services often return. Returns `None`
/// when neither form holds valid JSON.
pub fn parse_json_text(text: &str) -> Option<serde_json::Value> {
    let mut in_block = false;
    let mut block = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str(&block) {
                return Some(parsed);
            }
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    serde_json::from_str(text.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_confidence() {
        assert_eq!(normalize_confidence(0.42), 0.42);
        assert_eq!(normalize_confidence(1.0), 1.0);
        assert_eq!(normalize_confidence(1.5), 1.0);
        assert_eq!(normalize_confidence(2.0), 0.02);
        assert_eq!(normalize_confidence(85.0), 0.85);
        assert_eq!(normalize_confidence(250.0), 1.0);
        assert_eq!(normalize_confidence(-1.0), 0.0);
        assert_eq!(normalize_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_condition_terms_dedup_and_chief_complaint() {
        let extraction = ClinicalExtraction {
            chief_complaint: "Sore throat".to_string(),
            symptoms: vec![
                "fever".to_string(),
                "sore throat".to_string(),
                " ".to_string(),
                "Fever".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(extraction.condition_terms(), vec!["fever", "sore throat"]);
    }

    #[test]
    fn test_chief_complaint_appended() {
        let extraction = ClinicalExtraction {
            chief_complaint: "chest pain".to_string(),
            symptoms: vec!["shortness of breath".to_string()],
            ..Default::default()
        };
        assert_eq!(
            extraction.condition_terms(),
            vec!["shortness of breath", "chest pain"]
        );
    }

    #[test]
    fn test_outputs_default_missing_fields() {
        let findings: ImagingFindings =
            serde_json::from_value(serde_json::json!({ "findings": ["opacity"] })).unwrap();
        assert_eq!(findings.image_type, "unknown");
        assert_eq!(findings.findings, vec!["opacity"]);

        let history: HistoryRecord = serde_json::from_value(serde_json::json!({
            "riskFlags": ["anticoagulated"],
            "chronicConditions": ["atrial fibrillation"],
            "interactions": []
        }))
        .unwrap();
        assert_eq!(history.risk_flags, vec!["anticoagulated"]);
        assert_eq!(history.chronic_conditions, vec!["atrial fibrillation"]);
    }

    #[test]
    fn test_treatment_queries_cover_mapped_entries_only() {
        let entries = vec![
            CodedEntry {
                condition: "fever".to_string(),
                code: Some("MG26".to_string()),
                description: "Fever".to_string(),
            },
            CodedEntry {
                condition: "malaise".to_string(),
                code: None,
                description: "No match".to_string(),
            },
        ];
        let args = SuggestTreatmentsArgs::for_mapped(&entries);
        assert_eq!(
            args.conditions,
            vec![TreatmentQuery {
                condition: "fever".to_string(),
                icd_code: "MG26".to_string(),
            }]
        );

        let lookup: TreatmentLookup = serde_json::from_value(serde_json::json!({
            "treatment_plan": [{ "condition": "fever", "icd_code": "MG26", "treatments": [] }]
        }))
        .unwrap();
        assert_eq!(lookup.suggestions[0].icd_code, "MG26");
    }

    #[test]
    fn test_submission_ack_accepts_diagnosis_id() {
        let ack: SubmissionAck = serde_json::from_value(serde_json::json!({
            "status": "ok",
            "diagnosis_id": "dx-7",
            "timestamp": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(ack.id, "dx-7");
    }

    #[test]
    fn test_parse_json_text_fenced_and_bare() {
        let fenced = "Here you go:\n```json\n{\"transcript\": \"hi\"}\n```\n";
        assert_eq!(
            parse_json_text(fenced).unwrap()["transcript"],
            serde_json::json!("hi")
        );
        assert_eq!(
            parse_json_text(" {\"mapped_count\": 2} ").unwrap()["mapped_count"],
            serde_json::json!(2)
        );
        assert!(parse_json_text("no json here").is_none());
    }
}
