//! Application layer for diagnostic-crew
//!
//! This crate contains the use cases, the tool gateway, the specialist
//! workers and the port definitions. It depends only on the domain layer.

pub mod config;
pub mod gateway;
pub mod ports;
pub mod use_cases;
pub mod workers;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::RunParams;
pub use gateway::ToolGateway;
pub use ports::{
    bootstrap::{BootstrapError, ContextBootstrapPort, InitialContext, NoBootstrap},
    progress::{NoProgress, RunProgressNotifier},
    run_logger::{NoRunEventLogger, RunEvent, RunEventLogger},
    tool_adapter::ToolAdapter,
};
pub use use_cases::coordinate_crew::{CoordinateError, CrewCoordinator};
pub use use_cases::run_intake::{RunError, RunIntakeOutput, RunIntakeUseCase};
pub use use_cases::submit_decision::{SubmissionDriver, SubmissionFailed};
pub use workers::{SpecialistWorker, WorkerAssignment};
