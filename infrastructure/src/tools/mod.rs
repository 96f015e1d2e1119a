//! Tool adapters
//!
//! Concrete implementations of the application's `ToolAdapter` port and the
//! registry that assembles them into a gateway.

pub mod history;
pub mod registry;
pub mod remote;

pub use history::LocalHistoryTool;
pub use registry::ToolRegistry;
pub use remote::RemoteTool;
