//! Output formatter trait

use crew_application::ReviewOutcome;
use crew_domain::OutputFormat;

/// Trait for formatting review outcomes
pub trait OutputFormatter {
    /// Full report with every stage's analysis
    fn format(&self, outcome: &ReviewOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &ReviewOutcome) -> String;

    /// Finding counts and saved paths only
    fn format_summary(&self, outcome: &ReviewOutcome) -> String;

    fn render(&self, outcome: &ReviewOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Report => self.format(outcome),
            OutputFormat::Summary => self.format_summary(outcome),
            OutputFormat::Json => self.format_json(outcome),
        }
    }
}
