//! Application-level configuration.
//!
//! - [`RunParams`]: run deadline, tool policies and instruction templates

pub mod run_params;

pub use run_params::RunParams;
