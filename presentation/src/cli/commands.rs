//! CLI command definitions

use clap::{Parser, ValueEnum};
use crew_domain::OrchestrationRequest;
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Decision, worker outcomes and receipt for a human reader
    Text,
    /// One JSON document
    Json,
}

impl From<OutputFormat> for crew_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => crew_domain::OutputFormat::Text,
            OutputFormat::Json => crew_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for diagnostic-crew
#[derive(Parser, Debug)]
#[command(name = "diagnostic-crew")]
#[command(
    author,
    version,
    about = "Clinical intake crew: three specialists, one preliminary assessment"
)]
#[command(long_about = r#"
Diagnostic Crew runs one clinical intake for a subject.

The run has four steps:
1. Bootstrap: fetch the subject's audio, image and notes from the backend
2. Fan-out: Clinical Scribe, Radiology Analyst and Records Analyst run concurrently
3. Synthesis: surviving evidence becomes a preliminary assessment
4. Submission: the assessment is filed with the backend

Configuration files are loaded from (in priority order):
1. CREW_* environment variables (CREW_RUN__DEADLINE_SECS=60)
2. --config <path>     Explicit config file
3. ./crew.toml         Project-level config
4. ~/.config/diagnostic-crew/config.toml   Global config

Example:
  diagnostic-crew pt-42
  diagnostic-crew pt-42 --image img-1 --deadline 30
  diagnostic-crew --notes "Fever and dry cough for three days" --format json
"#)]
pub struct Cli {
    /// Subject (patient) identifier
    pub subject: Option<String>,

    /// Consultation audio reference (overrides the backend's)
    #[arg(long, value_name = "REF")]
    pub audio: Option<String>,

    /// Medical image reference (overrides the backend's)
    #[arg(long, value_name = "REF")]
    pub image: Option<String>,

    /// Clinical notes (overrides the backend's)
    #[arg(long, value_name = "TEXT")]
    pub notes: Option<String>,

    /// Run deadline in seconds (overrides run.deadline_secs)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a JSONL run event log to this file
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Requested output format, if any was given on the command line.
    pub fn output_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }

    /// The intake request described by the arguments.
    pub fn to_request(&self) -> OrchestrationRequest {
        let mut request = OrchestrationRequest::new();
        if let Some(subject) = &self.subject {
            request = request.with_subject(subject);
        }
        if let Some(audio) = &self.audio {
            request = request.with_audio(audio);
        }
        if let Some(image) = &self.image {
            request = request.with_image(image);
        }
        if let Some(notes) = &self.notes {
            request = request.with_notes(notes);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::parse_from([
            "diagnostic-crew",
            "pt-42",
            "--image",
            "img-1",
            "--deadline",
            "30",
            "-vv",
            "--json",
        ]);

        assert_eq!(cli.subject.as_deref(), Some("pt-42"));
        assert_eq!(cli.deadline, Some(30));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_format(), Some(OutputFormat::Json));

        let request = cli.to_request();
        assert_eq!(request.subject_id(), Some("pt-42"));
        assert_eq!(request.image_ref(), Some("img-1"));
        assert!(request.audio_ref().is_none());
    }

    #[test]
    fn test_json_conflicts_with_format() {
        let result = Cli::try_parse_from(["diagnostic-crew", "--json", "--format", "text"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_arguments_is_empty_request() {
        let cli = Cli::parse_from(["diagnostic-crew"]);
        assert!(cli.to_request().is_empty());
        assert!(cli.output_format().is_none());
    }
}
