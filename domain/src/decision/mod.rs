//! Decision domain
//!
//! The synthesized assessment, its pure construction from namespaced worker
//! results, and the receipt returned by the decision sink.

pub mod entities;
pub mod synthesis;

pub use entities::{
    Classification, ConfidenceLevel, DISCLAIMER, EvidenceGap, RecordEntry, SubmissionReceipt,
    SynthesizedDecision, TREATMENT_DISCLAIMER, TreatmentPlan,
};
pub use synthesis::{SynthesisError, synthesize};
