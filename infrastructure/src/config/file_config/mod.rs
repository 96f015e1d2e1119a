//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod instructions;
mod logging;
mod output;
mod run;
mod tools;

pub use backend::FileBackendConfig;
pub use instructions::FileInstructionsConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use run::FileRunConfig;
pub use tools::{FileToolOverride, FileToolsConfig};

use crew_application::RunParams;
use crew_domain::config::validation::{ConfigIssue, ConfigIssueCode};
use crew_domain::tool::entities::ALL_TOOLS;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Patient backend (bootstrap and submission)
    pub backend: FileBackendConfig,
    /// Tool service and retry policy
    pub tools: FileToolsConfig,
    /// Run deadline
    pub run: FileRunConfig,
    /// Per-worker instruction overrides
    pub instructions: FileInstructionsConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Diagnostic and run-event logs
    pub logging: FileLoggingConfig,
}

fn check_url(field: &str, url: Option<&str>, issues: &mut Vec<ConfigIssue>) {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return;
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::InvalidUrl {
                field: field.to_string(),
                value: url.to_string(),
            },
            format!("{}: '{}' must start with http:// or https://", field, url),
        ));
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.run.deadline_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroDuration {
                    field: "run.deadline_secs".to_string(),
                },
                "run.deadline_secs: must be greater than zero",
            ));
        }
        if self.tools.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroDuration {
                    field: "tools.timeout_secs".to_string(),
                },
                "tools.timeout_secs: must be greater than zero",
            ));
        }
        if self.backend.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroDuration {
                    field: "backend.timeout_secs".to_string(),
                },
                "backend.timeout_secs: must be greater than zero",
            ));
        }
        for (name, o) in &self.tools.overrides {
            if o.timeout_secs == Some(0) {
                let field = format!("tools.overrides.{}.timeout_secs", name);
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroDuration {
                        field: field.clone(),
                    },
                    format!("{}: must be greater than zero", field),
                ));
            }
            if !ALL_TOOLS.contains(&name.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownTool { name: name.clone() },
                    format!("tools.overrides.{}: no worker calls this tool", name),
                ));
            }
        }

        check_url("backend.url", self.backend.url.as_deref(), &mut issues);
        check_url("tools.endpoint", self.tools.endpoint.as_deref(), &mut issues);

        issues.extend(self.instructions.validate());

        issues
    }

    /// Run parameters for the application layer.
    pub fn to_run_params(&self) -> RunParams {
        self.tools.override_policies().into_iter().fold(
            RunParams::default()
                .with_deadline(self.run.deadline())
                .with_default_policy(self.tools.default_policy())
                .with_instructions(self.instructions.to_instruction_set()),
            |params, (tool, policy)| params.with_tool_policy(tool, policy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_domain::OutputFormat;
    use crew_domain::config::validation::Severity;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[backend]
url = "https://clinic.example.org/api"
token = "secret"
timeout_secs = 10

[tools]
endpoint = "http://localhost:9000"
timeout_secs = 20
history_file = "./history.json"

[tools.overrides.analyze_radiology]
timeout_secs = 60

[run]
deadline_secs = 45

[output]
format = "json"
color = false

[logging]
dir = "/tmp/crew"
run_log = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url(), Some("https://clinic.example.org/api"));
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
        assert_eq!(config.backend.timeout(), Duration::from_secs(10));
        assert_eq!(config.tools.timeout_secs, 20);
        assert_eq!(config.run.deadline_secs, 45);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.logging.run_log);
        assert!(config.validate().is_empty());

        let params = config.to_run_params();
        assert_eq!(params.deadline, Duration::from_secs(45));
        assert_eq!(params.policy_for("analyze_radiology").timeout, Duration::from_secs(60));
        assert_eq!(params.policy_for("map_icd_codes").timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[run]
deadline_secs = 30
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.deadline_secs, 30);
        // Defaults should apply
        assert!(config.backend.url.is_none());
        assert!(config.output.color);
        assert_eq!(config.tools.max_retries, 2);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_zero_durations() {
        let toml_str = r#"
[run]
deadline_secs = 0

[tools]
timeout_secs = 0

[backend]
timeout_secs = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
    }

    #[test]
    fn test_validate_bad_url_scheme() {
        let config = FileConfig {
            backend: FileBackendConfig {
                url: Some("ftp://clinic".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let issues = config.validate();

        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::InvalidUrl { ref field, .. } if field == "backend.url"
        ));
    }

    #[test]
    fn test_unknown_tool_override_warns() {
        let toml_str = r#"
[tools.overrides.send_fax]
max_retries = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
