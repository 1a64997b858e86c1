//! Structural extraction of severity-rated findings from stage output.
//!
//! Agents are asked to rate issues as CRITICAL, HIGH, MEDIUM, LOW or INFO and
//! to cite line numbers. This module recovers those markers without trying
//! to understand the prose around them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SEVERITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b(CRITICAL|HIGH|MEDIUM|LOW|INFO)\b
        | (?i:severity)\W{0,4}(?i:(critical|high|medium|low|info))\b
        | \[(?i:(critical|high|medium|low|info))\]",
    )
    .expect("severity pattern is valid")
});

static LINE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\b(?:lines?|ln)\.?\s*[:#]?\s*(\d+))|\bL(\d+)\b")
        .expect("line pattern is valid")
});

/// How many following lines may carry the line reference for a marker
const LINE_LOOKAHEAD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl FindingSeverity {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }

    /// CRITICAL or HIGH
    pub fn is_severe(&self) -> bool {
        *self >= Self::High
    }
}

impl std::fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// One severity marker found in stage output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: FindingSeverity,
    /// Source line cited on the marker's line or shortly after
    pub line: Option<u32>,
    /// The text line the marker appeared on, without markdown decoration
    pub summary: String,
}

/// Extract all findings from a block of text, in order of appearance.
pub fn extract_findings(text: &str) -> Vec<Finding> {
    let lines: Vec<&str> = text.lines().collect();
    let mut findings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(severity) = severity_in(line) else {
            continue;
        };

        let mut cited = line_ref_in(line);
        if cited.is_none() {
            for next in lines.iter().skip(idx + 1).take(LINE_LOOKAHEAD) {
                if severity_in(next).is_some() {
                    break;
                }
                if let Some(n) = line_ref_in(next) {
                    cited = Some(n);
                    break;
                }
            }
        }

        findings.push(Finding {
            severity,
            line: cited,
            summary: clean_summary(line),
        });
    }

    findings
}

fn severity_in(line: &str) -> Option<FindingSeverity> {
    let caps = SEVERITY.captures(line)?;
    let word = caps
        .iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str())?;
    FindingSeverity::parse(word)
}

fn line_ref_in(line: &str) -> Option<u32> {
    let caps = LINE_REF.captures(line)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| m.as_str().parse().ok())
}

fn clean_summary(line: &str) -> String {
    let trimmed = line
        .trim()
        .trim_start_matches(['#', '-', '*', '>', ' '])
        .replace("**", "");
    crate::core::string::truncate(trimmed.trim(), 160)
}

/// Finding counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeveritySummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                FindingSeverity::Critical => summary.critical += 1,
                FindingSeverity::High => summary.high += 1,
                FindingSeverity::Medium => summary.medium += 1,
                FindingSeverity::Low => summary.low += 1,
                FindingSeverity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn highest(&self) -> Option<FindingSeverity> {
        [
            (self.critical, FindingSeverity::Critical),
            (self.high, FindingSeverity::High),
            (self.medium, FindingSeverity::Medium),
            (self.low, FindingSeverity::Low),
            (self.info, FindingSeverity::Info),
        ]
        .into_iter()
        .find(|(count, _)| *count > 0)
        .map(|(_, severity)| severity)
    }
}

impl std::fmt::Display for SeveritySummary {
    /// e.g. `2 critical, 1 high, 3 low`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "no rated findings");
        }
        let parts: Vec<String> = [
            (self.critical, "critical"),
            (self.high, "high"),
            (self.medium, "medium"),
            (self.low, "low"),
            (self.info, "info"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();
        write!(f, "{}", parts.join(", "))
    }
}
