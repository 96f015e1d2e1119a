//! Output formatter trait

use crew_application::RunIntakeOutput;

/// Trait for formatting run results
pub trait OutputFormatter {
    /// Format the complete run for a human reader
    fn format(&self, output: &RunIntakeOutput) -> String;

    /// Format as JSON
    fn format_json(&self, output: &RunIntakeOutput) -> String;
}
