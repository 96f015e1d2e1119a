//! Application use cases

pub mod coordinate_crew;
pub mod run_intake;
pub mod submit_decision;
