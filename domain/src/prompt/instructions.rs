//! Instruction templates for each specialist worker
//!
//! The coordinator expands these against the bootstrapped context before
//! dispatch; the expanded text travels with every tool call the worker
//! makes so the inference services see the same framing.

use crate::worker::WorkerKind;
use serde::{Deserialize, Serialize};

const SCRIBE: &str = r#"You are a clinical documentation specialist.
Extract structured medical data from the consultation for patient {subject_id}.

Input sources (use whichever are available):
- Audio consultation: {audio_ref}
- Clinical notes: {clinical_notes}

Identify the chief complaint, every distinct symptom as a separate item,
symptom duration, vitals (BP, HR, temp, SpO2, RR) and medications mentioned.
If the presentation is COVID-like (fever, cough, fatigue, loss of taste or
smell) include "COVID-19" as a candidate condition."#;

const RADIOLOGY: &str = r#"You are a radiology analyst processing medical imaging for patient {subject_id}.

Medical image: {image_ref}

Report the image type (X-ray, MRI, CT, dermatological, other), every
identified anomaly or "No significant findings", the anatomical region,
severity (none, mild, moderate, severe) and a confidence between 0.0 and 1.0.
Do not make a final diagnosis."#;

const RECORDS: &str = r#"You are a records analyst reviewing the history of patient {subject_id}.

Current clinical notes: {clinical_notes}

Surface historical and chronic conditions, allergies or intolerances,
current medications, drug interaction warnings and risk flags relevant to
this encounter. Do not make a final diagnosis."#;

/// Per-worker instruction templates, with optional overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionSet {
    pub scribe: String,
    pub radiology: String,
    pub records: String,
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self {
            scribe: SCRIBE.to_string(),
            radiology: RADIOLOGY.to_string(),
            records: RECORDS.to_string(),
        }
    }
}

impl InstructionSet {
    pub fn for_worker(&self, worker: WorkerKind) -> &str {
        match worker {
            WorkerKind::Scribe => &self.scribe,
            WorkerKind::Radiology => &self.radiology,
            WorkerKind::Records => &self.records,
        }
    }

    /// Replace one worker's template.
    pub fn with_override(mut self, worker: WorkerKind, template: impl Into<String>) -> Self {
        let template = template.into();
        match worker {
            WorkerKind::Scribe => self.scribe = template,
            WorkerKind::Radiology => self.radiology = template,
            WorkerKind::Records => self.records = template,
        }
        self
    }
}
