//! Tool domain module
//!
//! Every external call the orchestration engine makes is a tool call:
//! transcription, term extraction, code mapping, imaging analysis, history
//! retrieval and the final submission. This module holds the pure
//! definitions; the gateway that enforces timeout and retry policy lives in
//! the application layer, and the concrete adapters in infrastructure.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ ToolCall     │───▶│ ToolPolicy   │───▶│ output / ToolError│
//! │ (name, args) │    │ (timeout,    │    │ + ToolInvocation │
//! └──────────────┘    │  retries)    │    └──────────────────┘
//!                     └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolCall`]: an invocation request with JSON arguments
//! - [`ToolPolicy`]: timeout and exponential-backoff retry policy
//! - [`ToolError`] / [`ToolErrorKind`]: classified failure (transient or not)
//! - [`ToolInvocation`]: telemetry for one invocation
//! - [`payloads`]: typed argument/output structs per tool

pub mod entities;
pub mod payloads;
pub mod value_objects;

pub use entities::{ToolCall, ToolPolicy};
pub use value_objects::{ToolError, ToolErrorKind, ToolInvocation};
