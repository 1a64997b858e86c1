//! Results of a pipeline run

use crate::crew::stage::StageId;
use serde::{Deserialize, Serialize};

/// Output of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub stage: StageId,
    pub output: String,
}

impl TaskResult {
    pub fn new(stage: StageId, output: impl Into<String>) -> Self {
        Self {
            stage,
            output: output.into(),
        }
    }
}

/// All stage outputs of a completed run, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub source_name: String,
    pub results: Vec<TaskResult>,
}

impl ReviewResult {
    pub fn new(source_name: impl Into<String>, results: Vec<TaskResult>) -> Self {
        Self {
            source_name: source_name.into(),
            results,
        }
    }

    /// Output of the last stage; this is the report body.
    pub fn final_output(&self) -> &str {
        self.results.last().map(|r| r.output.as_str()).unwrap_or("")
    }

    pub fn output_of(&self, stage: StageId) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.output.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_output_is_last_stage() {
        let result = ReviewResult::new(
            "calc.py",
            vec![
                TaskResult::new(StageId::BugDetector, "bugs"),
                TaskResult::new(StageId::DocumentationAnalyzer, "report"),
            ],
        );
        assert_eq!(result.final_output(), "report");
        assert_eq!(result.output_of(StageId::BugDetector), Some("bugs"));
        assert_eq!(result.output_of(StageId::SecurityAnalyzer), None);
    }

    #[test]
    fn test_empty_result_has_empty_final_output() {
        assert_eq!(ReviewResult::new("x", Vec::new()).final_output(), "");
    }
}
