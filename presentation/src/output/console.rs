//! Console output formatter for review results

use crate::output::formatter::OutputFormatter;
use colored::{ColoredString, Colorize};
use crew_application::ReviewOutcome;
use crew_domain::{
    ConfigIssue, CrewDefinition, Finding, FindingSeverity, Severity, SourceFile,
};
use serde::Serialize;

/// Formats review outcomes for console display
pub struct ConsoleFormatter;

/// JSON view of a finished review
#[derive(Serialize)]
struct OutcomeView<'a> {
    source: &'a str,
    files: &'a [String],
    stages: Vec<StageView<'a>>,
    findings: &'a [Finding],
    summary: crew_domain::SeveritySummary,
    report_path: String,
    raw_path: String,
    generated_at: String,
}

#[derive(Serialize)]
struct StageView<'a> {
    stage: &'static str,
    name: &'static str,
    output: &'a str,
}

impl ConsoleFormatter {
    /// Format the complete review: every stage, then the saved report
    pub fn format(outcome: &ReviewOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Code Review Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Source:".cyan().bold(),
            outcome.source_name
        ));
        if outcome.files.len() > 1 {
            output.push_str(&format!(
                "{} {}\n",
                "Files:".cyan().bold(),
                outcome.files.join(", ")
            ));
        }
        output.push('\n');

        for (idx, result) in outcome.result.results.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "Stage {}: {}",
                idx + 1,
                result.stage.display_name()
            )));
            output.push_str(&format!("\n{}\n", result.output.trim_end()));
        }

        output.push_str(&Self::section_header("Findings"));
        output.push_str(&Self::format_findings(&outcome.report.findings));

        output.push_str(&Self::saved_paths(outcome));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &ReviewOutcome) -> String {
        let view = OutcomeView {
            source: &outcome.source_name,
            files: &outcome.files,
            stages: outcome
                .result
                .results
                .iter()
                .map(|r| StageView {
                    stage: r.stage.as_str(),
                    name: r.stage.display_name(),
                    output: &r.output,
                })
                .collect(),
            findings: &outcome.report.findings,
            summary: outcome.report.summary,
            report_path: outcome.saved.markdown_path.display().to_string(),
            raw_path: outcome.saved.raw_path.display().to_string(),
            generated_at: outcome.report.generated_at.to_rfc3339(),
        };
        serde_json::to_string_pretty(&view).unwrap_or_else(|_| "{}".to_string())
    }

    /// Finding counts, severe findings and saved paths
    pub fn format_summary(outcome: &ReviewOutcome) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Code Review Summary ===".cyan().bold()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Source:".bold(),
            outcome.source_name
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Findings:".bold(),
            outcome.report.summary
        ));

        let severe: Vec<_> = outcome
            .report
            .findings
            .iter()
            .filter(|f| f.severity.is_severe())
            .cloned()
            .collect();
        if !severe.is_empty() {
            output.push('\n');
            output.push_str(&Self::format_findings(&severe));
        }

        output.push_str(&Self::saved_paths(outcome));
        output
    }

    /// One line per finding, most severe first
    pub fn format_findings(findings: &[Finding]) -> String {
        if findings.is_empty() {
            return format!("{}\n", "  (no rated findings)".dimmed());
        }

        let mut sorted: Vec<&Finding> = findings.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

        sorted
            .into_iter()
            .map(|f| {
                let location = f
                    .line
                    .map(|line| format!("line {}", line))
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "  {:<10} {:<10} {}\n",
                    Self::severity_label(f.severity),
                    location.dimmed(),
                    f.summary
                )
            })
            .collect()
    }

    /// Reviewable files of a repository
    pub fn format_files(repo_url: &str, files: &[SourceFile]) -> String {
        let mut output = format!("{} {}\n", "Repository:".cyan().bold(), repo_url);
        if files.is_empty() {
            output.push_str(&format!("{}\n", "  (no reviewable files)".dimmed()));
            return output;
        }
        for file in files {
            output.push_str(&format!("  {:<60} {:>10} bytes\n", file.path, file.size));
        }
        output.push_str(&format!("\n{} files\n", files.len()));
        output
    }

    /// Agents and tasks of a crew, in pipeline order
    pub fn format_crew(crew: &CrewDefinition) -> String {
        let mut output = Self::header("Review Crew");
        output.push('\n');

        for (idx, task) in crew.tasks().iter().enumerate() {
            let agent = crew.agent_for_task(task.stage);
            output.push_str(&Self::section_header(&format!(
                "{}. {}",
                idx + 1,
                task.stage.display_name()
            )));
            output.push_str(&format!("{} {}\n", "Role:".yellow().bold(), agent.role));
            output.push_str(&format!("{} {}\n", "Goal:".yellow().bold(), agent.goal));
            if task.context.is_empty() {
                output.push_str(&format!("{} (none)\n", "Reads:".yellow().bold()));
            } else {
                let names: Vec<_> = task.context.iter().map(|s| s.display_name()).collect();
                output.push_str(&format!(
                    "{} {}\n",
                    "Reads:".yellow().bold(),
                    names.join(", ")
                ));
            }
            output.push_str(&format!(
                "{}\n{}\n",
                "Expected output:".yellow().bold(),
                Self::indent(task.expected_output.trim(), "  ")
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Configuration warnings and errors
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}\n", "error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}\n", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect()
    }

    fn severity_label(severity: FindingSeverity) -> ColoredString {
        let label = severity.to_string();
        match severity {
            FindingSeverity::Critical => label.red().bold(),
            FindingSeverity::High => label.red(),
            FindingSeverity::Medium => label.yellow(),
            FindingSeverity::Low => label.blue(),
            FindingSeverity::Info => label.dimmed(),
        }
    }

    fn saved_paths(outcome: &ReviewOutcome) -> String {
        format!(
            "\n{} {}\n{} {}\n",
            "Report:".green().bold(),
            outcome.saved.markdown_path.display(),
            "Raw output:".green().bold(),
            outcome.saved.raw_path.display()
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &ReviewOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &ReviewOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_summary(&self, outcome: &ReviewOutcome) -> String {
        Self::format_summary(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use crew_application::SavedReport;
    use crew_domain::{OutputFormat, Report, ReviewResult, StageId, TaskResult};
    use std::path::PathBuf;

    fn outcome() -> ReviewOutcome {
        let results: Vec<_> = StageId::pipeline()
            .iter()
            .map(|s| TaskResult::new(*s, format!("{} notes", s.as_str())))
            .collect();
        let final_text = "## Findings\n- CRITICAL: division by zero at line 3\n- LOW: naming on line 9";
        let at = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        ReviewOutcome {
            source_name: "calc.py".to_string(),
            files: vec!["calc.py".to_string()],
            result: ReviewResult::new("calc.py", results),
            report: Report::compose("calc.py", final_text, at),
            saved: SavedReport {
                markdown_path: PathBuf::from("reports/calc_review_20250314_092653.md"),
                raw_path: PathBuf::from("reports/calc_raw_20250314_092653.txt"),
            },
        }
    }

    #[test]
    fn test_full_format_lists_every_stage() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&outcome());
        for (idx, stage) in StageId::pipeline().iter().enumerate() {
            assert!(text.contains(&format!("Stage {}: {}", idx + 1, stage.display_name())));
        }
        assert!(text.contains("reports/calc_review_20250314_092653.md"));
        assert!(text.contains("CRITICAL"));
    }

    #[test]
    fn test_summary_shows_only_severe_findings() {
        colored::control::set_override(false);
        let text = ConsoleFormatter.render(&outcome(), OutputFormat::Summary);
        assert!(text.contains("Findings: 1 critical, 1 low"));
        assert!(text.contains("line 3"));
        assert!(!text.contains("line 9"));
    }

    #[test]
    fn test_json_format_is_parseable() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&outcome())).unwrap();
        assert_eq!(json["source"], "calc.py");
        assert_eq!(json["stages"].as_array().unwrap().len(), 4);
        assert_eq!(json["stages"][0]["stage"], "bug_detector");
        assert_eq!(json["summary"]["critical"], 1);
        assert_eq!(json["findings"][0]["line"], 3);
    }

    #[test]
    fn test_format_files_empty_listing() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_files("https://github.com/org/empty", &[]);
        assert!(text.contains("no reviewable files"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
