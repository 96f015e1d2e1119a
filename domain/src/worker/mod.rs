//! Specialist worker domain
//!
//! Static description of the worker roster ([`WorkerKind`]), the reports each
//! worker returns on success, and the tagged [`WorkerResult`] the coordinator
//! collects exactly once per worker.

pub mod kind;
pub mod reports;
pub mod result;

pub use kind::WorkerKind;
pub use reports::{
    CodedEntry, HistoryReport, ImagingReport, NarrativeSource, ScribeReport, TreatmentOption,
    TreatmentSuggestion, WorkerReport,
};
pub use result::{FailureKind, WorkerFailure, WorkerOutcome, WorkerResult};
