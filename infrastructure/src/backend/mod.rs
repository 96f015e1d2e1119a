//! Patient backend adapters (bootstrap and decision submission)

pub mod bootstrap;
pub mod submission;

pub use bootstrap::HttpBootstrap;
pub use submission::HttpSubmissionTool;
