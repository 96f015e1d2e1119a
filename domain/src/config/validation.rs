//! Structured configuration issues
//!
//! Configuration loaders report problems as a list of [`ConfigIssue`]s
//! instead of failing on the first one, so a caller can print every
//! warning and refuse to start only when an [`Severity::Error`] is present.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: a run cannot start with this configuration.
    Error,
    /// Non-fatal: the run starts but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A duration that must be positive is zero.
    ZeroDuration { field: String },
    /// A URL that does not start with `http://` or `https://`.
    InvalidUrl { field: String, value: String },
    /// An instruction override references a key bootstrap never writes.
    UnknownPlaceholder { field: String, key: String },
    /// An instruction override cannot be parsed as a template.
    MalformedTemplate { field: String },
    /// A per-tool override names a tool no worker calls.
    UnknownTool { name: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Whether any issue in `issues` is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors() {
        let warning = ConfigIssue::warning(
            ConfigIssueCode::UnknownTool {
                name: "fax".to_string(),
            },
            "unknown tool",
        );
        assert!(!has_errors(std::slice::from_ref(&warning)));

        let error = ConfigIssue::error(
            ConfigIssueCode::ZeroDuration {
                field: "run.deadline_secs".to_string(),
            },
            "zero",
        );
        assert!(has_errors(&[warning, error]));
    }

    #[test]
    fn test_empty_has_no_errors() {
        assert!(!has_errors(&[]));
    }
}
