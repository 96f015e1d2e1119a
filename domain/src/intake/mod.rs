//! Intake domain
//!
//! The request that starts a run and the well-known input keys bootstrap
//! writes into the context.

pub mod keys;
pub mod request;

pub use request::OrchestrationRequest;
