//! Validated crew definition (Aggregate)

use super::agent::AgentSpec;
use super::stage::StageId;
use super::task::TaskSpec;
use super::validation::{ConfigIssue, ConfigIssueCode};
use crate::prompt::template::{KNOWN_PLACEHOLDERS, placeholders_in};
use thiserror::Error;

/// Raised when agent/task definitions cannot form a runnable crew.
#[derive(Error, Debug, Clone)]
#[error("invalid crew definition: {}", summarize(.issues))]
pub struct CrewValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .filter(|i| i.severity == super::validation::Severity::Error)
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The full set of agents and tasks for one review pipeline.
///
/// Exactly one agent and one task per [`StageId`], stored in pipeline order.
/// Only constructible through [`CrewDefinition::new`], so holding one means
/// the definitions passed validation.
#[derive(Debug, Clone)]
pub struct CrewDefinition {
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
}

impl CrewDefinition {
    /// Validate and build a crew. Warnings are tolerated; any error fails.
    pub fn new(agents: Vec<AgentSpec>, tasks: Vec<TaskSpec>) -> Result<Self, CrewValidationError> {
        let issues = Self::validate(&agents, &tasks);
        if ConfigIssue::has_errors(&issues) {
            return Err(CrewValidationError { issues });
        }

        let mut agents = agents;
        agents.sort_by_key(|a| a.stage.position());

        let mut tasks = tasks;
        tasks.sort_by_key(|t| t.stage.position());
        for task in &mut tasks {
            task.context.sort_by_key(|s| s.position());
            task.context.dedup();
        }

        Ok(Self { agents, tasks })
    }

    /// Check a set of definitions without building anything.
    pub fn validate(agents: &[AgentSpec], tasks: &[TaskSpec]) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for stage in StageId::pipeline() {
            let agent_count = agents.iter().filter(|a| a.stage == *stage).count();
            let task_count = tasks.iter().filter(|t| t.stage == *stage).count();

            if agent_count == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingAgent {
                        stage: stage.as_str().to_string(),
                    },
                    format!("agents.{} is not defined", stage.as_str()),
                ));
            }
            if task_count == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingTask {
                        stage: stage.as_str().to_string(),
                    },
                    format!("tasks.{} is not defined", stage.as_str()),
                ));
            }
            if agent_count > 1 || task_count > 1 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateDefinition {
                        stage: stage.as_str().to_string(),
                    },
                    format!("{} is defined more than once", stage.as_str()),
                ));
            }
        }

        for agent in agents {
            let prefix = format!("agents.{}", agent.stage.as_str());
            for (field, value) in [
                ("role", &agent.role),
                ("goal", &agent.goal),
                ("backstory", &agent.backstory),
            ] {
                if value.trim().is_empty() {
                    issues.push(empty_field(&prefix, field));
                }
            }
        }

        for task in tasks {
            let prefix = format!("tasks.{}", task.stage.as_str());
            if task.description.trim().is_empty() {
                issues.push(empty_field(&prefix, "description"));
            }
            if task.expected_output.trim().is_empty() {
                issues.push(empty_field(&prefix, "expected_output"));
            }

            for dependency in &task.context {
                if dependency.position() >= task.stage.position() {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::InvalidContext {
                            stage: task.stage.as_str().to_string(),
                            dependency: dependency.as_str().to_string(),
                        },
                        format!(
                            "{}.context: '{}' does not run before '{}'",
                            prefix,
                            dependency.as_str(),
                            task.stage.as_str()
                        ),
                    ));
                }
            }

            for placeholder in placeholders_in(&task.description) {
                if !KNOWN_PLACEHOLDERS.contains(&placeholder.as_str()) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownPlaceholder {
                            stage: task.stage.as_str().to_string(),
                            placeholder: placeholder.clone(),
                        },
                        format!(
                            "{}.description: unknown placeholder '{{{}}}' will be left as-is",
                            prefix, placeholder
                        ),
                    ));
                }
            }
        }

        issues
    }

    /// Agents in pipeline order.
    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// Tasks in pipeline order.
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn agent(&self, stage: StageId) -> &AgentSpec {
        // Validation guarantees exactly one agent per stage, sorted by position
        &self.agents[stage.position()]
    }

    pub fn task(&self, stage: StageId) -> &TaskSpec {
        &self.tasks[stage.position()]
    }

    /// The agent assigned to a stage's task.
    pub fn agent_for_task(&self, stage: StageId) -> &AgentSpec {
        self.agent(self.task(stage).agent)
    }

    pub fn stage_count(&self) -> usize {
        self.tasks.len()
    }
}

fn empty_field(prefix: &str, field: &str) -> ConfigIssue {
    let path = format!("{}.{}", prefix, field);
    ConfigIssue::error(
        ConfigIssueCode::EmptyField {
            field: path.clone(),
        },
        format!("{} cannot be empty", path),
    )
}
