//! Pure synthesis of a decision from the namespaced worker results

use super::entities::{
    Classification, ConfidenceLevel, DISCLAIMER, EvidenceGap, RecordEntry, SynthesizedDecision,
    TREATMENT_DISCLAIMER, TreatmentPlan,
};
use crate::orchestration::NamespacedResults;
use crate::worker::{FailureKind, ImagingReport, TreatmentSuggestion, WorkerKind};
use thiserror::Error;

const NO_CONDITION: &str = "No specific condition identified";
const NOT_DOCUMENTED: &str = "Not documented";
const TREATMENTS_UNAVAILABLE: &str = "treatment suggestions unavailable";

const WATCH_FOR: &str = "What to watch for: symptoms that get worse or do not improve, new \
     symptoms, or a fever that will not come down.";
const URGENT_CARE: &str = "Seek urgent care right away if you have trouble breathing, chest \
     pain, confusion, fainting, or feel much worse quickly.";

/// Errors raised while synthesizing a decision
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("Insufficient evidence: every worker failed ({})", format_gaps(.gaps))]
    InsufficientEvidence { gaps: Vec<EvidenceGap> },
}

fn format_gaps(gaps: &[EvidenceGap]) -> String {
    gaps.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Push `item` unless an equal one (case-insensitive) is already present.
fn push_unique(list: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() && !list.iter().any(|x| x.eq_ignore_ascii_case(item)) {
        list.push(item.to_string());
    }
}

fn evidence_gaps(results: &NamespacedResults) -> Vec<EvidenceGap> {
    results
        .unavailable()
        .into_iter()
        .map(|source| match results.gaps.get(&source) {
            Some(failure) => EvidenceGap {
                source,
                kind: failure.kind,
                reason: failure.message.clone(),
            },
            None => EvidenceGap {
                source,
                kind: FailureKind::ToolPermanent,
                reason: "no result".to_string(),
            },
        })
        .collect()
}

fn classifications(results: &NamespacedResults) -> Vec<Classification> {
    let mut out: Vec<Classification> = results
        .scribe
        .iter()
        .flat_map(|report| report.coded_entries.iter())
        .filter(|entry| entry.is_mapped())
        .filter_map(|entry| {
            let code = entry.code.as_deref()?.trim().to_string();
            let title = if entry.description.trim().is_empty() {
                entry.condition.trim().to_string()
            } else {
                entry.description.trim().to_string()
            };
            Some(Classification {
                code,
                title,
                condition: entry.condition.trim().to_string(),
            })
        })
        .collect();

    out.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.condition.cmp(&b.condition)));
    out.dedup_by(|later, earlier| later.code == earlier.code);
    out
}

/// Labeled options for coded conditions, one per code.
fn suggested_treatments(results: &NamespacedResults) -> Option<TreatmentPlan> {
    let scribe = results.scribe.as_ref()?;
    let mut suggestions: Vec<TreatmentSuggestion> = scribe
        .treatments
        .iter()
        .filter(|s| !s.icd_code.trim().is_empty() && !s.treatments.is_empty())
        .cloned()
        .collect();
    suggestions.sort_by(|a, b| {
        a.icd_code
            .cmp(&b.icd_code)
            .then_with(|| a.condition.cmp(&b.condition))
    });
    suggestions.dedup_by(|later, earlier| later.icd_code == earlier.icd_code);

    (!suggestions.is_empty()).then(|| TreatmentPlan {
        suggestions,
        disclaimer: TREATMENT_DISCLAIMER.to_string(),
    })
}

/// Imaging that explicitly reports nothing abnormal.
fn reported_normal(radiology: &ImagingReport) -> bool {
    let severity = radiology.severity.trim();
    radiology.significant_findings().next().is_none()
        && (severity.eq_ignore_ascii_case("none")
            || severity.eq_ignore_ascii_case("normal")
            || !radiology.findings.is_empty())
}

fn same_substance(drug: &str, allergy: &str) -> bool {
    let drug = drug.trim().to_lowercase();
    let allergy = allergy.trim().to_lowercase();
    !drug.is_empty() && !allergy.is_empty() && (drug.contains(&allergy) || allergy.contains(&drug))
}

/// Disagreements between specialist reports, in a fixed order: imaging
/// against the consultation, then suggested treatments against allergies.
fn contradictions(
    classifications: &[Classification],
    plan: Option<&TreatmentPlan>,
    results: &NamespacedResults,
) -> Vec<String> {
    let mut out = Vec::new();

    if results.scribe.is_some()
        && let Some(radiology) = &results.radiology
    {
        let findings: Vec<&str> = radiology.significant_findings().collect();
        let severe = radiology.severity.trim().eq_ignore_ascii_case("severe");
        if classifications.is_empty() && (severe || !findings.is_empty()) {
            let shown = if findings.is_empty() {
                "abnormal findings".to_string()
            } else {
                findings.join("; ")
            };
            out.push(format!(
                "Imaging reports {} (severity {}) but the consultation yielded no coded condition",
                shown,
                radiology.severity.trim()
            ));
        }
        if !classifications.is_empty() && reported_normal(radiology) {
            let conditions: Vec<&str> = classifications.iter().map(|c| c.title.as_str()).collect();
            out.push(format!(
                "Consultation coded {} but {} imaging of the {} shows no significant findings",
                conditions.join(", "),
                radiology.image_type.trim(),
                radiology.anatomical_region.trim()
            ));
        }
    }

    if let (Some(plan), Some(records)) = (plan, &results.records) {
        for suggestion in &plan.suggestions {
            for option in &suggestion.treatments {
                for allergy in &records.allergies {
                    if same_substance(&option.drug_name, allergy) {
                        push_unique(
                            &mut out,
                            &format!(
                                "Suggested treatment {} for {} conflicts with recorded allergy: {}",
                                option.drug_name.trim(),
                                suggestion.condition.trim(),
                                allergy.trim()
                            ),
                        );
                    }
                }
            }
        }
    }

    out
}

fn hypothesis(classifications: &[Classification], results: &NamespacedResults) -> String {
    if !classifications.is_empty() {
        let mut conditions = Vec::new();
        for c in classifications {
            push_unique(&mut conditions, &c.title);
        }
        return format!("Findings consistent with {}", conditions.join(", "));
    }

    let findings: Vec<&str> = results
        .radiology
        .iter()
        .flat_map(|r| r.significant_findings())
        .collect();
    if !findings.is_empty() {
        return format!("Findings consistent with {}", findings.join("; "));
    }

    NO_CONDITION.to_string()
}

fn confidence(results: &NamespacedResults) -> ConfidenceLevel {
    let scores: Vec<f64> = results
        .scribe
        .iter()
        .map(|r| r.confidence)
        .chain(results.radiology.iter().map(|r| r.confidence))
        .map(|c| c.clamp(0.0, 1.0))
        .collect();
    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    ConfidenceLevel::grade(results.available().len(), mean)
}

fn risk_flags(results: &NamespacedResults) -> Vec<String> {
    let mut flags = Vec::new();
    if let Some(records) = &results.records {
        for flag in records
            .risk_flags
            .iter()
            .chain(records.interaction_warnings.iter())
        {
            push_unique(&mut flags, flag);
        }
        for allergy in &records.allergies {
            push_unique(&mut flags, &format!("Allergy: {}", allergy.trim()));
        }
    }
    if let Some(radiology) = &results.radiology
        && radiology.severity.trim().eq_ignore_ascii_case("severe")
    {
        push_unique(
            &mut flags,
            &format!("Severe imaging findings ({})", radiology.anatomical_region.trim()),
        );
    }
    flags
}

fn record_entry(
    results: &NamespacedResults,
    hypothesis: &str,
    level: ConfidenceLevel,
    risk_flags: &[String],
    contradictions: &[String],
    gaps: &[EvidenceGap],
) -> RecordEntry {
    let presenting_complaint = results
        .scribe
        .as_ref()
        .map(|s| s.chief_complaint.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or(NOT_DOCUMENTED)
        .to_string();

    let mut findings = Vec::new();
    if let Some(scribe) = &results.scribe {
        if !scribe.extracted_terms.is_empty() {
            findings.push(format!("Reported symptoms: {}", scribe.extracted_terms.join(", ")));
        }
        for (name, value) in &scribe.vitals {
            let value = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            findings.push(format!("{}: {}", name, value));
        }
    }
    if let Some(radiology) = &results.radiology {
        for finding in radiology.significant_findings() {
            findings.push(format!(
                "{} {}: {} (severity {})",
                radiology.image_type.trim(),
                radiology.anatomical_region.trim(),
                finding,
                radiology.severity.trim()
            ));
        }
    }

    let mut history = Vec::new();
    if let Some(records) = &results.records {
        for condition in &records.chronic_conditions {
            push_unique(&mut history, condition);
        }
        for medication in &records.medications {
            push_unique(&mut history, &format!("Current medication: {}", medication.trim()));
        }
    }

    let mut assessment = format!("{}. Confidence: {}.", hypothesis, level);
    if !contradictions.is_empty() {
        assessment.push_str(&format!(
            " Conflicting specialist reports ({}).",
            contradictions.len()
        ));
    }
    if !gaps.is_empty() {
        let sources: Vec<&str> = gaps.iter().map(|g| g.source.display_name()).collect();
        assessment.push_str(&format!(" Not assessed: {}.", sources.join(", ")));
    }
    assessment.push_str(" Plan: clinician review of this preliminary assessment.");

    RecordEntry {
        subject_id: results.subject_id.clone(),
        presenting_complaint,
        findings,
        history,
        risk_flags: risk_flags.to_vec(),
        contradictions: contradictions.to_vec(),
        assessment,
    }
}

fn patient_summary(
    classifications: &[Classification],
    results: &NamespacedResults,
    risk_flags: &[String],
    contradictions: &[String],
) -> String {
    let mut lines = Vec::new();

    let looked_at: Vec<&str> = results
        .available()
        .into_iter()
        .map(|w| match w {
            WorkerKind::Scribe => "what you told us about your symptoms",
            WorkerKind::Radiology => "your medical image",
            WorkerKind::Records => "your medical history",
        })
        .collect();
    lines.push(format!("We reviewed {}.", looked_at.join(", ")));

    if classifications.is_empty() {
        lines.push(
            "We did not find a specific condition. A clinician will review your results."
                .to_string(),
        );
    } else {
        let names: Vec<&str> = classifications.iter().map(|c| c.condition.as_str()).collect();
        lines.push(format!(
            "Your symptoms may be related to: {}. This is not a final diagnosis; a clinician \
             will confirm it.",
            names.join(", ")
        ));
    }

    if !risk_flags.is_empty() {
        lines.push(format!(
            "Because of your history ({}), please mention these to your clinician.",
            risk_flags.join("; ")
        ));
    }

    if !contradictions.is_empty() {
        lines.push(
            "Some of your results do not agree with each other; your clinician will look at \
             them closely."
                .to_string(),
        );
    }

    lines.push(WATCH_FOR.to_string());
    lines.push(URGENT_CARE.to_string());
    lines.join("\n")
}

/// Build the decision from whatever evidence is available.
///
/// Pure and deterministic: no clock, no randomness, all collections in a
/// fixed order. One or two missing sources are tolerated and flagged;
/// three fail with [`SynthesisError::InsufficientEvidence`].
pub fn synthesize(results: &NamespacedResults) -> Result<SynthesizedDecision, SynthesisError> {
    let unavailable = evidence_gaps(results);
    if results.available().is_empty() {
        return Err(SynthesisError::InsufficientEvidence { gaps: unavailable });
    }

    let classifications = classifications(results);
    let suggested_treatments = suggested_treatments(results);
    let contradictions = contradictions(&classifications, suggested_treatments.as_ref(), results);
    let hypothesis = hypothesis(&classifications, results);
    let confidence_level = match confidence(results) {
        ConfidenceLevel::High if !contradictions.is_empty() => ConfidenceLevel::Moderate,
        level => level,
    };
    let risk_flags = risk_flags(results);
    let record_entry = record_entry(
        results,
        &hypothesis,
        confidence_level,
        &risk_flags,
        &contradictions,
        &unavailable,
    );
    let patient_summary =
        patient_summary(&classifications, results, &risk_flags, &contradictions);
    let mut evidence_flags: Vec<String> = unavailable
        .iter()
        .map(|gap| gap.source.unavailable_flag())
        .collect();
    if results
        .scribe
        .as_ref()
        .is_some_and(|s| s.treatment_note.is_some())
    {
        evidence_flags.push(TREATMENTS_UNAVAILABLE.to_string());
    }

    Ok(SynthesizedDecision {
        hypothesis,
        confidence_level,
        classifications,
        record_entry,
        patient_summary,
        risk_flags,
        contradictions,
        suggested_treatments,
        unavailable,
        evidence_flags,
        disclaimer: DISCLAIMER.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{
        CodedEntry, HistoryReport, ImagingReport, NarrativeSource, ScribeReport, TreatmentOption,
        WorkerFailure,
    };
    use std::collections::BTreeMap;

    fn scribe() -> ScribeReport {
        ScribeReport {
            transcript_or_notes: "Fever and dry cough for three days".to_string(),
            source: NarrativeSource::Notes,
            chief_complaint: "Fever".to_string(),
            extracted_terms: vec!["fever".to_string(), "cough".to_string()],
            vitals: BTreeMap::from([("temp".to_string(), serde_json::json!("38.9C"))]),
            coded_entries: vec![
                CodedEntry {
                    condition: "fever".to_string(),
                    code: Some("MG26".to_string()),
                    description: "Fever of other or unknown origin".to_string(),
                },
                CodedEntry {
                    condition: "cough".to_string(),
                    code: Some("MD12".to_string()),
                    description: "Cough".to_string(),
                },
                CodedEntry {
                    condition: "pyrexia".to_string(),
                    code: Some("MG26".to_string()),
                    description: "Fever of other or unknown origin".to_string(),
                },
                CodedEntry {
                    condition: "malaise".to_string(),
                    code: None,
                    description: "No match found".to_string(),
                },
            ],
            mapped_count: 3,
            confidence: 0.9,
            treatments: Vec::new(),
            treatment_note: None,
        }
    }

    fn suggestion(condition: &str, code: &str, drugs: &[&str]) -> TreatmentSuggestion {
        TreatmentSuggestion {
            condition: condition.to_string(),
            icd_code: code.to_string(),
            treatments: drugs
                .iter()
                .map(|d| TreatmentOption {
                    drug_name: d.to_string(),
                    ..Default::default()
                })
                .collect(),
            source: "openFDA".to_string(),
        }
    }

    fn imaging() -> ImagingReport {
        ImagingReport {
            image_type: "X-ray".to_string(),
            findings: vec!["Right lower lobe consolidation".to_string()],
            anatomical_region: "chest".to_string(),
            severity: "moderate".to_string(),
            confidence: 0.8,
        }
    }

    fn history() -> HistoryReport {
        HistoryReport {
            risk_flags: vec!["Type 2 diabetes".to_string()],
            chronic_conditions: vec!["Hypertension".to_string()],
            interaction_warnings: vec!["Metformin + contrast dye".to_string()],
            allergies: vec!["Penicillin".to_string()],
            medications: vec!["Metformin".to_string()],
        }
    }

    fn all_three() -> NamespacedResults {
        NamespacedResults {
            subject_id: Some("pt-42".to_string()),
            scribe: Some(scribe()),
            radiology: Some(imaging()),
            records: Some(history()),
            gaps: BTreeMap::new(),
        }
    }

    #[test]
    fn test_full_evidence_decision() {
        let decision = synthesize(&all_three()).unwrap();

        assert_eq!(decision.icd_codes(), vec!["MD12", "MG26"]);
        assert_eq!(
            decision.hypothesis,
            "Findings consistent with Cough, Fever of other or unknown origin"
        );
        assert_eq!(decision.confidence_level, ConfidenceLevel::High);
        assert!(decision.unavailable.is_empty());
        assert!(decision.evidence_flags.is_empty());
        assert_eq!(decision.record_entry.subject_id.as_deref(), Some("pt-42"));
        assert_eq!(decision.record_entry.presenting_complaint, "Fever");
        assert!(decision.risk_flags.contains(&"Allergy: Penicillin".to_string()));
        assert!(decision.patient_summary.contains("What to watch for"));
        assert!(decision.patient_summary.contains("urgent care"));
        assert_eq!(decision.disclaimer, DISCLAIMER);
    }

    #[test]
    fn test_missing_scribe_is_flagged() {
        let results = NamespacedResults {
            scribe: None,
            gaps: BTreeMap::from([(
                WorkerKind::Scribe,
                WorkerFailure::insufficient_input("no audio or notes"),
            )]),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        assert!(decision.has_flag("scribe evidence unavailable"));
        assert_eq!(decision.unavailable.len(), 1);
        assert_eq!(decision.unavailable[0].kind, FailureKind::InsufficientInput);
        assert!(decision.classifications.is_empty());
        assert_eq!(
            decision.hypothesis,
            "Findings consistent with Right lower lobe consolidation"
        );
        assert_eq!(decision.record_entry.presenting_complaint, NOT_DOCUMENTED);
        assert_eq!(
            decision.available_sources(),
            vec![WorkerKind::Radiology, WorkerKind::Records]
        );
    }

    #[test]
    fn test_records_only_is_low_confidence() {
        let results = NamespacedResults {
            subject_id: Some("pt-42".to_string()),
            records: Some(history()),
            ..Default::default()
        };

        let decision = synthesize(&results).unwrap();

        assert_eq!(decision.hypothesis, NO_CONDITION);
        assert_eq!(decision.confidence_level, ConfidenceLevel::Low);
        assert_eq!(decision.evidence_flags.len(), 2);
    }

    #[test]
    fn test_all_missing_is_insufficient_evidence() {
        let results = NamespacedResults {
            gaps: BTreeMap::from([
                (WorkerKind::Scribe, WorkerFailure::insufficient_input("none")),
                (WorkerKind::Radiology, WorkerFailure::timeout("deadline")),
            ]),
            ..Default::default()
        };

        let SynthesisError::InsufficientEvidence { gaps } = synthesize(&results).unwrap_err();
        assert_eq!(gaps.len(), 3);
        assert_eq!(gaps[1].kind, FailureKind::Timeout);
        assert_eq!(gaps[2].reason, "no result");
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let results = all_three();
        let first = synthesize(&results).unwrap();
        let second = synthesize(&results).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.clinical_summary(), second.clinical_summary());
    }

    #[test]
    fn test_treatment_plan_one_per_code() {
        let mut scribe = scribe();
        scribe.treatments = vec![
            suggestion("fever", "MG26", &["Acetaminophen"]),
            suggestion("cough", "MD12", &["Dextromethorphan"]),
            suggestion("pyrexia", "MG26", &["Ibuprofen"]),
            suggestion("malaise", "MG99", &[]),
        ];
        let results = NamespacedResults {
            scribe: Some(scribe),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        let plan = decision.suggested_treatments.as_ref().unwrap();
        let codes: Vec<&str> = plan.suggestions.iter().map(|s| s.icd_code.as_str()).collect();
        assert_eq!(codes, vec!["MD12", "MG26"]);
        assert_eq!(plan.suggestions[1].treatments[0].drug_name, "Acetaminophen");
        assert_eq!(plan.disclaimer, TREATMENT_DISCLAIMER);
        assert!(decision.contradictions.is_empty());

        let summary = decision.clinical_summary();
        assert!(summary.contains("SUGGESTED TREATMENTS (for clinician review only):"));
        assert!(summary.contains("  [MD12] cough: Dextromethorphan"));
    }

    #[test]
    fn test_failed_treatment_lookup_is_flagged() {
        let mut scribe = scribe();
        scribe.treatment_note = Some("treatment lookup failed: 503".to_string());
        let results = NamespacedResults {
            scribe: Some(scribe),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        assert!(decision.suggested_treatments.is_none());
        assert!(decision.has_flag(TREATMENTS_UNAVAILABLE));
        assert_eq!(decision.icd_codes(), vec!["MD12", "MG26"]);
    }

    #[test]
    fn test_abnormal_imaging_without_coded_condition_is_contradiction() {
        let mut scribe = scribe();
        for entry in &mut scribe.coded_entries {
            entry.code = None;
        }
        let results = NamespacedResults {
            scribe: Some(scribe),
            radiology: Some(ImagingReport {
                severity: "severe".to_string(),
                ..imaging()
            }),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        assert_eq!(
            decision.contradictions,
            vec![
                "Imaging reports Right lower lobe consolidation (severity severe) but the \
                 consultation yielded no coded condition"
                    .to_string()
            ]
        );
        assert_eq!(decision.record_entry.contradictions, decision.contradictions);
        assert!(decision.record_entry.assessment.contains("Conflicting specialist reports (1)"));
        // Both confidences are high; the contradiction caps the level
        assert_eq!(decision.confidence_level, ConfidenceLevel::Moderate);
        assert!(decision.clinical_summary().starts_with("CONTRADICTION: Imaging reports"));
        assert!(decision.patient_summary.contains("do not agree"));
    }

    #[test]
    fn test_coded_condition_with_normal_imaging_is_contradiction() {
        let results = NamespacedResults {
            radiology: Some(ImagingReport {
                findings: vec!["No significant findings".to_string()],
                severity: "none".to_string(),
                ..imaging()
            }),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        assert_eq!(decision.contradictions.len(), 1);
        assert!(decision.contradictions[0].starts_with("Consultation coded Cough"));
        assert!(
            decision.contradictions[0]
                .ends_with("X-ray imaging of the chest shows no significant findings")
        );
    }

    #[test]
    fn test_treatment_against_allergy_is_contradiction() {
        let mut scribe = scribe();
        scribe.treatments = vec![suggestion("fever", "MG26", &["Penicillin V Potassium"])];
        let results = NamespacedResults {
            scribe: Some(scribe),
            ..all_three()
        };

        let decision = synthesize(&results).unwrap();

        assert_eq!(
            decision.contradictions,
            vec![
                "Suggested treatment Penicillin V Potassium for fever conflicts with recorded \
                 allergy: Penicillin"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_missing_radiology_has_no_imaging_contradiction() {
        let mut scribe = scribe();
        for entry in &mut scribe.coded_entries {
            entry.code = None;
        }
        let results = NamespacedResults {
            scribe: Some(scribe),
            radiology: None,
            gaps: BTreeMap::from([(WorkerKind::Radiology, WorkerFailure::timeout("deadline"))]),
            ..all_three()
        };

        assert!(synthesize(&results).unwrap().contradictions.is_empty());
    }

    #[test]
    fn test_clinical_summary_lists_codes() {
        let summary = synthesize(&all_three()).unwrap().clinical_summary();
        assert!(summary.contains("[MD12] Cough (cough)"));
        assert!(summary.contains("Confidence: High"));
        assert!(summary.ends_with(DISCLAIMER));
    }
}
