//! Infrastructure layer for diagnostic-crew
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod http;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use backend::{HttpBootstrap, HttpSubmissionTool};
pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use http::HttpClient;
pub use logging::JsonlRunEventLogger;
pub use tools::{LocalHistoryTool, RemoteTool, ToolRegistry};
