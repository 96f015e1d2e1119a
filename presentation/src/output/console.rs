//! Console output formatter for run results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use crew_application::{RunError, RunIntakeOutput};
use crew_domain::config::validation::{ConfigIssue, Severity};
use crew_domain::{
    ConfidenceLevel, EvidenceGap, SubmissionReceipt, SynthesizedDecision, WorkerOutcome,
    WorkerReport, WorkerResult,
};
use serde_json::json;

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run: worker outcomes, decision, receipt
    pub fn format(output: &RunIntakeOutput) -> String {
        let mut out = String::new();

        out.push_str(&Self::header("Diagnostic Crew Results"));
        out.push('\n');

        out.push_str(&Self::section_header("Specialists"));
        for result in &output.results {
            out.push_str(&Self::format_worker_result(result));
        }

        out.push_str(&Self::section_header("Preliminary Assessment"));
        out.push_str(&Self::format_decision(&output.decision));

        out.push_str(&Self::section_header("Submission"));
        out.push_str(&Self::format_receipt(&output.receipt));

        out.push_str(&Self::footer());
        out
    }

    /// Format as JSON
    pub fn format_json(output: &RunIntakeOutput) -> String {
        let document = json!({
            "receipt": output.receipt,
            "decision": output.decision,
            "results": output.results,
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per worker, plus the failure reason when it failed
    pub fn format_worker_result(result: &WorkerResult) -> String {
        let name = result.worker.display_name();
        match &result.outcome {
            WorkerOutcome::Success(report) => format!(
                "  {} {} {} {}\n",
                "v".green(),
                name.bold(),
                Self::report_summary(report),
                format!("({}ms)", result.elapsed_ms).dimmed()
            ),
            WorkerOutcome::Failure(failure) => format!(
                "  {} {} {} {}\n",
                "x".red(),
                name.bold(),
                format!("[{}]", failure.kind).yellow(),
                failure.message
            ),
        }
    }

    fn report_summary(report: &WorkerReport) -> String {
        match report {
            WorkerReport::Scribe(r) => format!(
                "{} term(s), {} coded",
                r.extracted_terms.len(),
                r.mapped_count
            ),
            WorkerReport::Radiology(r) => {
                let region = if r.anatomical_region.is_empty() {
                    String::new()
                } else {
                    format!(" of {}", r.anatomical_region)
                };
                format!("{}{}, severity {}", r.image_type, region, r.severity)
            }
            WorkerReport::Records(r) => format!(
                "{} risk flag(s), {} allergy(ies)",
                r.risk_flags.len(),
                r.allergies.len()
            ),
        }
    }

    /// Decision body: contradictions first, then hypothesis, codes, risks,
    /// treatments, gaps and the patient summary
    pub fn format_decision(decision: &SynthesizedDecision) -> String {
        let mut out = String::new();

        if !decision.contradictions.is_empty() {
            out.push_str(&format!("\n{}\n", "Contradictions:".red().bold()));
            for contradiction in &decision.contradictions {
                out.push_str(&format!("  {} {}\n", "!".red().bold(), contradiction.red()));
            }
        }

        out.push_str(&format!("\n{}\n", decision.hypothesis.bold()));
        out.push_str(&format!(
            "{} {}\n",
            "Confidence:".cyan().bold(),
            Self::confidence(decision.confidence_level)
        ));

        if !decision.classifications.is_empty() {
            out.push_str(&format!("\n{}\n", "ICD-11 Codes:".cyan().bold()));
            for c in &decision.classifications {
                out.push_str(&format!(
                    "  {} {} {}\n",
                    format!("[{}]", c.code).yellow(),
                    c.title,
                    format!("({})", c.condition).dimmed()
                ));
            }
        }

        if !decision.risk_flags.is_empty() {
            out.push_str(&format!("\n{}\n", "Risk Flags:".red().bold()));
            for flag in &decision.risk_flags {
                out.push_str(&format!("  * {}\n", flag));
            }
        }

        if let Some(plan) = &decision.suggested_treatments {
            out.push_str(&format!(
                "\n{}\n",
                "Suggested Treatments (for clinician review only):".cyan().bold()
            ));
            for suggestion in &plan.suggestions {
                let drugs: Vec<&str> = suggestion
                    .treatments
                    .iter()
                    .map(|t| t.drug_name.as_str())
                    .collect();
                out.push_str(&format!(
                    "  {} {}: {}\n",
                    format!("[{}]", suggestion.icd_code).yellow(),
                    suggestion.condition,
                    drugs.join(", ")
                ));
            }
            out.push_str(&format!("  {}\n", plan.disclaimer.dimmed()));
        }

        if !decision.unavailable.is_empty() {
            out.push_str(&format!("\n{}\n", "Evidence Unavailable:".yellow().bold()));
            out.push_str(&Self::format_gaps(&decision.unavailable));
        }

        out.push_str(&format!("\n{}\n", "Patient Summary:".cyan().bold()));
        out.push_str(&Self::indent(&decision.patient_summary, "  "));
        out.push('\n');

        out.push_str(&format!("\n{}\n", decision.disclaimer.dimmed()));
        out
    }

    pub fn format_gaps(gaps: &[EvidenceGap]) -> String {
        gaps.iter()
            .map(|g| {
                format!(
                    "  * {} {} {}\n",
                    g.source.display_name(),
                    format!("[{}]", g.kind).yellow(),
                    g.reason
                )
            })
            .collect()
    }

    pub fn format_receipt(receipt: &SubmissionReceipt) -> String {
        format!(
            "\n{} {} {} {}\n",
            "Filed:".green().bold(),
            receipt.id,
            format!("[{}]", receipt.status).green(),
            receipt.timestamp.to_rfc3339().dimmed()
        )
    }

    /// Fatal run error, with whatever the run produced before it stopped
    pub fn format_error(error: &RunError) -> String {
        let mut out = format!("{} {}\n", "Error:".red().bold(), error);

        match error {
            RunError::InsufficientEvidence { gaps } => {
                out.push_str(&Self::format_gaps(gaps));
            }
            RunError::SubmissionFailed { decision, .. } => {
                out.push_str(&format!(
                    "\n{}\n",
                    "The assessment was built but not filed:".yellow()
                ));
                out.push_str(&Self::format_decision(decision));
            }
            _ => {}
        }
        out
    }

    /// Configuration warnings and errors, one per line
    pub fn format_config_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}\n", "config error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}\n", "config warning:".yellow().bold(), issue.message)
                }
            })
            .collect()
    }

    fn confidence(level: ConfidenceLevel) -> String {
        match level {
            ConfidenceLevel::High => level.as_str().green().bold().to_string(),
            ConfidenceLevel::Moderate => level.as_str().yellow().bold().to_string(),
            ConfidenceLevel::Low => level.as_str().red().bold().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, output: &RunIntakeOutput) -> String {
        Self::format(output)
    }

    fn format_json(&self, output: &RunIntakeOutput) -> String {
        Self::format_json(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_domain::{
        Classification, FailureKind, HistoryReport, RecordEntry, TREATMENT_DISCLAIMER,
        TreatmentOption, TreatmentPlan, TreatmentSuggestion, WorkerFailure, WorkerKind,
    };

    fn receipt() -> SubmissionReceipt {
        serde_json::from_value(json!({
            "status": "ok",
            "id": "dx-1",
            "timestamp": "2026-05-01T12:00:00Z"
        }))
        .unwrap()
    }

    fn decision() -> SynthesizedDecision {
        SynthesizedDecision {
            hypothesis: "Findings consistent with Pneumonia".to_string(),
            confidence_level: ConfidenceLevel::Moderate,
            classifications: vec![Classification {
                code: "CA40".to_string(),
                title: "Pneumonia".to_string(),
                condition: "pneumonia".to_string(),
            }],
            record_entry: RecordEntry::default(),
            patient_summary: "Rest and fluids.\nSeek care if breathing worsens.".to_string(),
            risk_flags: vec!["smoker".to_string()],
            contradictions: vec![],
            suggested_treatments: None,
            unavailable: vec![EvidenceGap {
                source: WorkerKind::Scribe,
                kind: FailureKind::InsufficientInput,
                reason: "no audio or notes".to_string(),
            }],
            evidence_flags: vec!["scribe evidence unavailable".to_string()],
            disclaimer: "For clinician review.".to_string(),
        }
    }

    fn output() -> RunIntakeOutput {
        RunIntakeOutput {
            receipt: receipt(),
            decision: decision(),
            results: vec![
                WorkerResult::failure(
                    WorkerKind::Scribe,
                    WorkerFailure::insufficient_input("no audio or notes"),
                    0,
                ),
                WorkerResult::success(
                    WorkerReport::Records(HistoryReport {
                        risk_flags: vec!["smoker".to_string()],
                        ..Default::default()
                    }),
                    12,
                ),
            ],
        }
    }

    #[test]
    fn test_format_contains_sections() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&output());

        assert!(text.contains("Findings consistent with Pneumonia"));
        assert!(text.contains("[CA40] Pneumonia"));
        assert!(text.contains("Clinical Scribe [insufficient_input] no audio or notes"));
        assert!(text.contains("Records Analyst 1 risk flag(s)"));
        assert!(text.contains("  Seek care if breathing worsens."));
        assert!(text.contains("Filed: dx-1 [ok]"));
    }

    #[test]
    fn test_format_json_is_valid() {
        let text = ConsoleFormatter::format_json(&output());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["receipt"]["id"], "dx-1");
        assert_eq!(value["decision"]["confidence_level"], "moderate");
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_submission_error_shows_decision() {
        colored::control::set_override(false);
        let error = RunError::SubmissionFailed {
            decision: Box::new(decision()),
            source: crew_domain::ToolError::new(
                "submit_decision",
                crew_domain::ToolErrorKind::Unavailable,
                "503",
            ),
        };
        let text = ConsoleFormatter::format_error(&error);

        assert!(text.starts_with("Error: Submission failed"));
        assert!(text.contains("not filed"));
        assert!(text.contains("Findings consistent with Pneumonia"));
    }

    #[test]
    fn test_contradictions_lead_the_decision() {
        colored::control::set_override(false);
        let decision = SynthesizedDecision {
            contradictions: vec!["Imaging reports consolidation but nothing was coded".to_string()],
            suggested_treatments: Some(TreatmentPlan {
                suggestions: vec![TreatmentSuggestion {
                    condition: "pneumonia".to_string(),
                    icd_code: "CA40".to_string(),
                    treatments: vec![TreatmentOption {
                        drug_name: "Amoxicillin".to_string(),
                        ..Default::default()
                    }],
                    source: "openFDA".to_string(),
                }],
                disclaimer: TREATMENT_DISCLAIMER.to_string(),
            }),
            ..decision()
        };

        let text = ConsoleFormatter::format_decision(&decision);

        let contradiction = text.find("! Imaging reports consolidation").unwrap();
        let hypothesis = text.find("Findings consistent with Pneumonia").unwrap();
        assert!(contradiction < hypothesis);
        assert!(text.contains("Suggested Treatments (for clinician review only):"));
        assert!(text.contains("  [CA40] pneumonia: Amoxicillin"));
        assert!(text.contains("not a prescription"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
