//! Orchestration request - the immutable input of a single run

use serde::{Deserialize, Serialize};

/// Identifiers for every modality available to one intake run.
///
/// Built once by the caller and never mutated afterwards. Blank strings are
/// normalized to `None` so that "present" always means "non-empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    subject_id: Option<String>,
    audio_ref: Option<String>,
    image_ref: Option<String>,
    notes: Option<String>,
}

impl OrchestrationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request for a known subject.
    pub fn for_subject(subject_id: impl Into<String>) -> Self {
        Self::new().with_subject(subject_id)
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = non_blank(subject_id.into());
        self
    }

    pub fn with_audio(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = non_blank(audio_ref.into());
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = non_blank(image_ref.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = non_blank(notes.into());
        self
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn audio_ref(&self) -> Option<&str> {
        self.audio_ref.as_deref()
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns `true` if no modality at all was supplied.
    pub fn is_empty(&self) -> bool {
        self.subject_id.is_none()
            && self.audio_ref.is_none()
            && self.image_ref.is_none()
            && self.notes.is_none()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
