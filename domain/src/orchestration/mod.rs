//! Fan-out/fan-in orchestration domain
//!
//! The coordinator's phase machine and the records it keeps while
//! collecting worker results.

pub mod entities;
pub mod value_objects;

pub use entities::{OrchestrationError, RunPhase};
pub use value_objects::{FanInRecord, NamespacedResults};
