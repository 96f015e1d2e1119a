//! Domain layer for diagnostic-crew
//!
//! Core types and pure logic of a clinical intake run. No I/O and no async
//! runtime; the application layer drives everything here.
//!
//! # Core Concepts
//!
//! ## Context
//!
//! A run-scoped key→value store. Bootstrap writes the input keys
//! (`subject_id`, `audio_ref`, `image_ref`, `clinical_notes`) and seals them;
//! each specialist worker owns one namespace (`scribe.`, `radiology.`,
//! `records.`) and nothing else.
//!
//! ## Workers
//!
//! Three fixed specialists run concurrently on the same snapshot and each
//! yields exactly one [`WorkerResult`], success or failure.
//!
//! ## Decision
//!
//! [`synthesize`] turns whatever evidence survived into a
//! [`SynthesizedDecision`], flagging each missing source.

pub mod config;
pub mod context;
pub mod decision;
pub mod intake;
pub mod orchestration;
pub mod prompt;
pub mod tool;
pub mod worker;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use context::{ContextEntry, ContextError, ContextSnapshot, ContextStore, Writer};
pub use decision::{
    Classification, ConfidenceLevel, EvidenceGap, RecordEntry, SubmissionReceipt, SynthesisError,
    SynthesizedDecision, TREATMENT_DISCLAIMER, TreatmentPlan, synthesize,
};
pub use intake::OrchestrationRequest;
pub use orchestration::{FanInRecord, NamespacedResults, OrchestrationError, RunPhase};
pub use prompt::{InstructionSet, TemplateError, expand, placeholders};
pub use tool::{ToolCall, ToolError, ToolErrorKind, ToolInvocation, ToolPolicy};
pub use worker::{
    CodedEntry, FailureKind, HistoryReport, ImagingReport, NarrativeSource, ScribeReport,
    TreatmentOption, TreatmentSuggestion, WorkerFailure, WorkerKind, WorkerOutcome, WorkerReport,
    WorkerResult,
};
