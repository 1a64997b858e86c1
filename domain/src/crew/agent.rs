//! Agent specification (Entity)

use super::stage::StageId;
use serde::{Deserialize, Serialize};

/// A named prompt persona bound to one pipeline stage.
///
/// Loaded once at startup and never mutated. `verbose` raises the log level
/// of the stage transcript; `memory` and `allow_delegation` are carried for
/// display only, since context passing is decided by the task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub stage: StageId,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub verbose: bool,
    pub memory: bool,
    pub allow_delegation: bool,
}

impl AgentSpec {
    pub fn new(
        stage: StageId,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            verbose: true,
            memory: true,
            allow_delegation: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }
}
