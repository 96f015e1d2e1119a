//! Presentation-level configuration
//!
//! Resolves how a run is displayed from the config file values and the
//! command-line flags, flags winning.

use crate::cli::commands::Cli;
use crew_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    pub fn new(format: Option<OutputFormat>, color: bool, show_progress: bool) -> Self {
        Self {
            format: format.unwrap_or_default(),
            color,
            show_progress,
        }
    }

    /// Apply command-line overrides.
    ///
    /// JSON output never shows progress so stdout stays parseable.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(format) = cli.output_format() {
            self.format = format.into();
        }
        if cli.no_color {
            self.color = false;
        }
        if cli.quiet || self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }

    /// Switch terminal colors on or off for the whole process.
    pub fn apply_color(&self) {
        colored::control::set_override(self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from(["diagnostic-crew", "pt-1", "--no-color", "--format", "json"]);
        let config = OutputConfig::new(Some(OutputFormat::Text), true, true).with_cli(&cli);

        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.color);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_file_values_kept_without_flags() {
        let cli = Cli::parse_from(["diagnostic-crew", "pt-1"]);
        let config = OutputConfig::new(None, false, true).with_cli(&cli);

        assert_eq!(config.format, OutputFormat::Text);
        assert!(!config.color);
        assert!(config.show_progress);
    }
}
