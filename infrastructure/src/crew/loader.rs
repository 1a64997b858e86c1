//! Crew definition loading
//!
//! A default four-stage crew is compiled into the binary; `--crew <path>`
//! replaces it with a user-supplied TOML file of the same shape.

use crew_domain::{
    AgentSpec, ConfigIssue, ConfigIssueCode, CrewDefinition, CrewValidationError, StageId,
    TaskSpec,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const DEFAULT_CREW: &str = include_str!("../../assets/crew.toml");

#[derive(Debug, Error)]
pub enum CrewLoadError {
    #[error("Failed to read crew file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse crew definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] CrewValidationError),
}

/// A validated crew plus any non-fatal issues found while loading it.
#[derive(Debug, Clone)]
pub struct LoadedCrew {
    pub definition: CrewDefinition,
    pub warnings: Vec<ConfigIssue>,
}

#[derive(Debug, Deserialize)]
struct RawCrewFile {
    #[serde(default)]
    agents: BTreeMap<String, RawAgent>,
    #[serde(default)]
    tasks: BTreeMap<String, RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    goal: String,
    #[serde(default)]
    backstory: String,
    #[serde(default = "default_true")]
    verbose: bool,
    #[serde(default = "default_true")]
    memory: bool,
    #[serde(default)]
    allow_delegation: bool,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    description: String,
    #[serde(default)]
    expected_output: String,
    agent: Option<String>,
    context: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

/// Loads [`CrewDefinition`]s from TOML
pub struct CrewLoader;

impl CrewLoader {
    /// The crew compiled into the binary
    pub fn load_default() -> Result<LoadedCrew, CrewLoadError> {
        Self::from_toml_str(DEFAULT_CREW)
    }

    /// Load `path` if given, otherwise the built-in crew
    pub fn load(path: Option<&Path>) -> Result<LoadedCrew, CrewLoadError> {
        match path {
            Some(path) => Self::load_file(path),
            None => Self::load_default(),
        }
    }

    pub fn load_file(path: &Path) -> Result<LoadedCrew, CrewLoadError> {
        debug!("Loading crew definition from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| CrewLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<LoadedCrew, CrewLoadError> {
        let raw: RawCrewFile = toml::from_str(text)?;
        let mut issues = Vec::new();

        let mut agents = Vec::new();
        for (key, agent) in raw.agents {
            let Some(stage) = stage_from_key(&key, "agents", &mut issues) else {
                continue;
            };
            agents.push(
                AgentSpec::new(stage, agent.role, agent.goal, agent.backstory)
                    .with_verbose(agent.verbose)
                    .with_memory(agent.memory)
                    .with_allow_delegation(agent.allow_delegation),
            );
        }

        let mut tasks = Vec::new();
        for (key, task) in raw.tasks {
            let Some(stage) = stage_from_key(&key, "tasks", &mut issues) else {
                continue;
            };
            let mut spec = TaskSpec::new(stage, task.description, task.expected_output);

            if let Some(agent) = task.agent {
                let field = format!("tasks.{}.agent", key);
                if let Some(agent_stage) = stage_from_key(&agent, &field, &mut issues) {
                    spec = spec.with_agent(agent_stage);
                }
            }
            if let Some(context) = task.context {
                let field = format!("tasks.{}.context", key);
                let deps = context
                    .iter()
                    .filter_map(|dep| stage_from_key(dep, &field, &mut issues))
                    .collect();
                spec = spec.with_context(deps);
            }
            tasks.push(spec);
        }

        issues.extend(CrewDefinition::validate(&agents, &tasks));
        if ConfigIssue::has_errors(&issues) {
            return Err(CrewValidationError { issues }.into());
        }

        let definition = CrewDefinition::new(agents, tasks)?;
        Ok(LoadedCrew {
            definition,
            warnings: issues,
        })
    }
}

/// Resolve a stage key. Accepts the canonical ids plus the `<name>_agent` /
/// `<name>_task` spellings used by older crew files.
fn stage_from_key(key: &str, section: &str, issues: &mut Vec<ConfigIssue>) -> Option<StageId> {
    let trimmed = key
        .strip_suffix("_agent")
        .or_else(|| key.strip_suffix("_task"))
        .unwrap_or(key);
    match trimmed.parse::<StageId>() {
        Ok(stage) => Some(stage),
        Err(_) => {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownStage {
                    key: key.to_string(),
                },
                format!("{}: '{}' is not a pipeline stage", section, key),
            ));
            None
        }
    }
}
