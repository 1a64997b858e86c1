//! Report composition (Value Object)

use super::findings::{Finding, SeveritySummary, extract_findings};
use crate::core::string::file_stem_safe;
use chrono::{DateTime, Local};
use serde::Serialize;

/// A finished review report, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// File-name-safe stem of the reviewed source
    pub base_name: String,
    pub source_name: String,
    pub markdown: String,
    /// Normalised final-stage text without the header
    pub raw: String,
    pub generated_at: DateTime<Local>,
    pub findings: Vec<Finding>,
    pub summary: SeveritySummary,
}

impl Report {
    /// Build the report from the final stage's output.
    pub fn compose(source_name: &str, final_text: &str, generated_at: DateTime<Local>) -> Self {
        let raw = normalize_output(final_text);
        let findings = extract_findings(&raw);
        let summary = SeveritySummary::from_findings(&findings);

        let mut markdown = format!(
            "# Code Review Report\n\n**File**: {}\n**Date**: {}\n",
            source_name,
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        if !summary.is_empty() {
            markdown.push_str(&format!("**Findings**: {}\n", summary));
        }
        markdown.push_str("\n---\n\n");
        markdown.push_str(&raw);

        Self {
            base_name: report_stem(source_name),
            source_name: source_name.to_string(),
            markdown,
            raw,
            generated_at,
            findings,
            summary,
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%Y%m%d_%H%M%S").to_string()
    }

    /// `<stem>_review_<ts>[_n].md`; `attempt` 0 has no numeric suffix.
    pub fn markdown_file_name(&self, attempt: u32) -> String {
        format!(
            "{}_review_{}{}.md",
            self.base_name,
            self.timestamp(),
            collision_suffix(attempt)
        )
    }

    /// `<stem>_raw_<ts>[_n].txt`
    pub fn raw_file_name(&self, attempt: u32) -> String {
        format!(
            "{}_raw_{}{}.txt",
            self.base_name,
            self.timestamp(),
            collision_suffix(attempt)
        )
    }
}

fn collision_suffix(attempt: u32) -> String {
    if attempt == 0 {
        String::new()
    } else {
        format!("_{}", attempt)
    }
}

/// File stem of the source name, made safe for the filesystem.
fn report_stem(source_name: &str) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source_name,
    };
    file_stem_safe(stem)
}

/// Clean up raw model output for persistence.
///
/// Line endings become `\n`, surrounding whitespace is trimmed, a single
/// enclosing ```` ```markdown ```` fence is removed and the text ends with
/// exactly one newline.
pub fn normalize_output(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let mut body = unified.trim();

    for opener in ["```markdown\n", "```md\n", "```\n"] {
        if let Some(inner) = body
            .strip_prefix(opener)
            .and_then(|rest| rest.strip_suffix("```"))
            && !inner.lines().any(|l| l.trim_start().starts_with("```"))
        {
            body = inner.trim();
            break;
        }
    }

    let mut out = body.to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::findings::FindingSeverity;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_compose_layout() {
        let report = Report::compose("calc.py", "## Summary\r\nAll good.\r\n", at());
        assert_eq!(
            report.markdown,
            "# Code Review Report\n\n**File**: calc.py\n**Date**: 2025-01-02 03:04:05\n\n---\n\n## Summary\nAll good.\n"
        );
        assert_eq!(report.raw, "## Summary\nAll good.\n");
        assert!(report.summary.is_empty());
    }

    #[test]
    fn test_compose_includes_findings_line() {
        let report = Report::compose(
            "calc.py",
            "- **CRITICAL** (line 4): division by zero\n- LOW: naming",
            at(),
        );
        assert!(report.markdown.contains("**Findings**: 1 critical, 1 low\n"));
        assert_eq!(report.findings[0].severity, FindingSeverity::Critical);
        assert_eq!(report.findings[0].line, Some(4));
    }

    #[test]
    fn test_file_names() {
        let report = Report::compose("my calc.v2.py", "text", at());
        assert_eq!(report.base_name, "my_calc_v2");
        assert_eq!(report.markdown_file_name(0), "my_calc_v2_review_20250102_030405.md");
        assert_eq!(report.raw_file_name(2), "my_calc_v2_raw_20250102_030405_2.txt");
    }

    #[test]
    fn test_repository_name_without_extension() {
        let report = Report::compose("demo-repo", "text", at());
        assert_eq!(report.base_name, "demo-repo");
    }

    #[test]
    fn test_normalize_unwraps_markdown_fence() {
        assert_eq!(
            normalize_output("```markdown\n# Report\nBody\n```\n\n"),
            "# Report\nBody\n"
        );
    }

    #[test]
    fn test_normalize_keeps_inner_code_blocks() {
        let text = "```markdown\n# Report\n```python\nx = 1\n```\n```";
        assert_eq!(normalize_output(text), format!("{}\n", text));
    }

    #[test]
    fn test_normalize_plain_text() {
        assert_eq!(normalize_output("  hello  "), "hello\n");
    }
}
