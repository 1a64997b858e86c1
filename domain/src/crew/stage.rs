//! Pipeline stage identifiers.

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One stage of the review pipeline.
///
/// The variant order is the execution order: every review runs
/// [`StageId::pipeline`] front to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    /// Logical errors, edge cases, crashes
    BugDetector,
    /// Vulnerabilities and unsafe patterns
    SecurityAnalyzer,
    /// Bottlenecks and algorithmic complexity
    PerformanceAnalyzer,
    /// Documentation quality; compiles the final report
    DocumentationAnalyzer,
}

impl StageId {
    /// All stages in execution order.
    pub fn pipeline() -> &'static [StageId] {
        &[
            StageId::BugDetector,
            StageId::SecurityAnalyzer,
            StageId::PerformanceAnalyzer,
            StageId::DocumentationAnalyzer,
        ]
    }

    /// Zero-based position of this stage in the pipeline.
    pub fn position(&self) -> usize {
        match self {
            StageId::BugDetector => 0,
            StageId::SecurityAnalyzer => 1,
            StageId::PerformanceAnalyzer => 2,
            StageId::DocumentationAnalyzer => 3,
        }
    }

    /// Stages that run before this one.
    pub fn predecessors(&self) -> &'static [StageId] {
        &Self::pipeline()[..self.position()]
    }

    /// The final stage, whose output becomes the report.
    pub fn last() -> StageId {
        StageId::DocumentationAnalyzer
    }

    /// Stable identifier used in configuration files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::BugDetector => "bug_detector",
            StageId::SecurityAnalyzer => "security_analyzer",
            StageId::PerformanceAnalyzer => "performance_analyzer",
            StageId::DocumentationAnalyzer => "documentation_analyzer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StageId::BugDetector => "Bug Detection",
            StageId::SecurityAnalyzer => "Security Analysis",
            StageId::PerformanceAnalyzer => "Performance Analysis",
            StageId::DocumentationAnalyzer => "Documentation Review",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for StageId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bug_detector" | "bug_detection" | "bugs" => Ok(StageId::BugDetector),
            "security_analyzer" | "security_analysis" | "security" => {
                Ok(StageId::SecurityAnalyzer)
            }
            "performance_analyzer" | "performance_analysis" | "performance" => {
                Ok(StageId::PerformanceAnalyzer)
            }
            "documentation_analyzer" | "documentation_review" | "documentation" => {
                Ok(StageId::DocumentationAnalyzer)
            }
            other => Err(DomainError::UnknownStage(other.to_string())),
        }
    }
}

impl Serialize for StageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order_matches_position() {
        for (i, stage) in StageId::pipeline().iter().enumerate() {
            assert_eq!(stage.position(), i);
        }
        assert_eq!(StageId::pipeline().last(), Some(&StageId::last()));
    }

    #[test]
    fn test_predecessors() {
        assert!(StageId::BugDetector.predecessors().is_empty());
        assert_eq!(
            StageId::PerformanceAnalyzer.predecessors(),
            &[StageId::BugDetector, StageId::SecurityAnalyzer]
        );
        assert_eq!(StageId::DocumentationAnalyzer.predecessors().len(), 3);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("security".parse::<StageId>().unwrap(), StageId::SecurityAnalyzer);
        assert_eq!(
            "Bug_Detector".parse::<StageId>().unwrap(),
            StageId::BugDetector
        );
        assert!("quality_assurance".parse::<StageId>().is_err());
    }

    #[test]
    fn test_serde_uses_stable_ids() {
        let json = serde_json::to_string(&StageId::PerformanceAnalyzer).unwrap();
        assert_eq!(json, "\"performance_analyzer\"");
        let stage: StageId = serde_json::from_str("\"documentation_analyzer\"").unwrap();
        assert_eq!(stage, StageId::DocumentationAnalyzer);
    }
}
