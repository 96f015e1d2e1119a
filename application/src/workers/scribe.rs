//! Transcription-and-coding worker
//!
//! audio (optional) → transcript → clinical entities → ICD-11 codes
//! → labeled treatment options (optional, best effort)

use super::{SpecialistWorker, WorkerAssignment};
use crate::gateway::ToolGateway;
use async_trait::async_trait;
use crew_domain::intake::keys;
use crew_domain::tool::entities::{
    ANALYZE_CLINICAL_NOTES, MAP_ICD_CODES, SUGGEST_TREATMENTS, TRANSCRIBE_AUDIO,
};
use crew_domain::tool::payloads::{
    AnalyzeNotesArgs, ClinicalExtraction, CodeMapping, MapCodesArgs, SuggestTreatmentsArgs,
    TranscribeArgs, Transcription, TreatmentLookup, normalize_confidence,
};
use crew_domain::{
    CodedEntry, FailureKind, NarrativeSource, ScribeReport, TreatmentSuggestion, WorkerFailure,
    WorkerKind, WorkerReport,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ScribeWorker {
    gateway: Arc<ToolGateway>,
}

impl ScribeWorker {
    pub fn new(gateway: Arc<ToolGateway>) -> Self {
        Self { gateway }
    }

    /// Narrative text to analyze, where it came from, and the transcription
    /// confidence when audio was used.
    async fn narrative(
        &self,
        assignment: &WorkerAssignment,
    ) -> Result<(String, NarrativeSource, Option<f64>), WorkerFailure> {
        let audio_ref = assignment.snapshot.text(keys::AUDIO_REF);
        let notes = assignment.snapshot.text(keys::CLINICAL_NOTES);

        let Some(audio_ref) = audio_ref else {
            return match notes {
                Some(notes) => Ok((notes.to_string(), NarrativeSource::Notes, None)),
                None => Err(WorkerFailure::insufficient_input(
                    "neither audio_ref nor clinical_notes is present",
                )),
            };
        };

        let transcription: Transcription = self
            .gateway
            .invoke_typed(
                TRANSCRIBE_AUDIO,
                &TranscribeArgs {
                    audio_ref: audio_ref.to_string(),
                    instruction: assignment.instruction.clone(),
                },
            )
            .await?;
        debug!(
            duration_seconds = transcription.duration_seconds,
            "Transcribed consultation audio"
        );

        let transcript = transcription.transcript.trim();
        let confidence = Some(normalize_confidence(transcription.confidence));
        match (transcript.is_empty(), notes) {
            (false, Some(notes)) => Ok((
                format!("{}\n\nClinical notes:\n{}", transcript, notes),
                NarrativeSource::Audio,
                confidence,
            )),
            (false, None) => Ok((transcript.to_string(), NarrativeSource::Audio, confidence)),
            // Silent recording: fall back to the notes on file
            (true, Some(notes)) => Ok((notes.to_string(), NarrativeSource::Notes, None)),
            (true, None) => Err(WorkerFailure::new(
                FailureKind::ToolPermanent,
                "transcription returned no text and no clinical notes are present",
            )),
        }
    }

    /// Labeled options for the mapped codes. A failed lookup leaves a note
    /// on the report instead of failing it; an unregistered tool is skipped.
    async fn treatments(
        &self,
        codes: &[CodedEntry],
    ) -> (Vec<TreatmentSuggestion>, Option<String>) {
        let args = SuggestTreatmentsArgs::for_mapped(codes);
        if args.conditions.is_empty() || !self.gateway.has_tool(SUGGEST_TREATMENTS) {
            return (Vec::new(), None);
        }

        match self
            .gateway
            .invoke_typed::<_, TreatmentLookup>(SUGGEST_TREATMENTS, &args)
            .await
        {
            Ok(lookup) => (lookup.suggestions, None),
            Err(e) => {
                warn!(error = %e, "Treatment lookup failed, continuing without suggestions");
                (Vec::new(), Some(format!("treatment lookup failed: {}", e)))
            }
        }
    }
}

#[async_trait]
impl SpecialistWorker for ScribeWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Scribe
    }

    async fn produce(&self, assignment: &WorkerAssignment) -> Result<WorkerReport, WorkerFailure> {
        let (text, source, transcription_confidence) = self.narrative(assignment).await?;

        let extraction: ClinicalExtraction = self
            .gateway
            .invoke_typed(
                ANALYZE_CLINICAL_NOTES,
                &AnalyzeNotesArgs {
                    text: text.clone(),
                    instruction: assignment.instruction.clone(),
                },
            )
            .await?;

        let terms = extraction.condition_terms();
        let mapping = if terms.is_empty() {
            CodeMapping::default()
        } else {
            self.gateway
                .invoke_typed::<_, CodeMapping>(
                    MAP_ICD_CODES,
                    &MapCodesArgs {
                        conditions: terms.clone(),
                    },
                )
                .await?
        };

        let mapped_count = mapping.codes.iter().filter(|c| c.is_mapped()).count();
        let (treatments, treatment_note) = self.treatments(&mapping.codes).await;
        let confidence = normalize_confidence(extraction.confidence)
            * transcription_confidence.unwrap_or(1.0);

        Ok(WorkerReport::Scribe(ScribeReport {
            transcript_or_notes: text,
            source,
            chief_complaint: extraction.chief_complaint.trim().to_string(),
            extracted_terms: terms,
            vitals: extraction.vitals,
            coded_entries: mapping.codes,
            mapped_count,
            confidence,
            treatments,
            treatment_note,
        }))
    }
}
