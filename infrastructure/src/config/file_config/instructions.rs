//! Instruction overrides from TOML (`[instructions]` section)

use crew_domain::config::validation::{ConfigIssue, ConfigIssueCode};
use crew_domain::intake::keys;
use crew_domain::{InstructionSet, WorkerKind, placeholders};
use serde::{Deserialize, Serialize};

/// Raw per-worker template overrides
///
/// Unset workers keep the built-in template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInstructionsConfig {
    pub scribe: Option<String>,
    pub radiology: Option<String>,
    pub records: Option<String>,
}

impl FileInstructionsConfig {
    fn overrides(&self) -> impl Iterator<Item = (WorkerKind, &str)> {
        [
            (WorkerKind::Scribe, self.scribe.as_deref()),
            (WorkerKind::Radiology, self.radiology.as_deref()),
            (WorkerKind::Records, self.records.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, template)| template.map(|t| (kind, t)))
    }

    /// Built-in templates with the configured overrides applied.
    pub fn to_instruction_set(&self) -> InstructionSet {
        self.overrides()
            .fold(InstructionSet::default(), |set, (kind, template)| {
                set.with_override(kind, template)
            })
    }

    /// Check every override against the keys bootstrap writes.
    ///
    /// Worker namespaces are empty at dispatch time, so only input keys
    /// can ever resolve.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (kind, template) in self.overrides() {
            let field = format!("instructions.{}", kind.as_str());
            match placeholders(template) {
                Ok(keys_used) => {
                    for key in keys_used.into_iter().filter(|k| !keys::is_input_key(k)) {
                        issues.push(ConfigIssue::error(
                            ConfigIssueCode::UnknownPlaceholder {
                                field: field.clone(),
                                key: key.clone(),
                            },
                            format!("{}: placeholder '{{{}}}' can never be resolved", field, key),
                        ));
                    }
                }
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::MalformedTemplate {
                        field: field.clone(),
                    },
                    format!("{}: {}", field, e),
                )),
            }
        }
        issues
    }
}
