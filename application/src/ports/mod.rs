//! Port definitions (interfaces for external adapters)

pub mod bootstrap;
pub mod progress;
pub mod run_logger;
pub mod tool_adapter;
