//! Configuration file loading for diagnostic-crew
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CREW_`-prefixed environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./crew.toml` or `./.crew.toml`
//! 4. Global: `$XDG_CONFIG_HOME/diagnostic-crew/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileBackendConfig, FileConfig, FileInstructionsConfig, FileLoggingConfig, FileOutputConfig,
    FileRunConfig, FileToolOverride, FileToolsConfig,
};
pub use loader::ConfigLoader;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or building adapters from it
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
