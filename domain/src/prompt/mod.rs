//! Prompt domain
//!
//! Worker instruction templates and the pure `{key}` expander that fills
//! them from a context snapshot.

pub mod instructions;
pub mod template;

pub use instructions::InstructionSet;
pub use template::{TemplateError, expand, placeholders};
