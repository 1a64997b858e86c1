//! Task specification (Entity)

use super::stage::StageId;
use serde::{Deserialize, Serialize};

/// The work handed to one stage's agent.
///
/// `description` is a template (see
/// [`PromptTemplate::render_description`](crate::prompt::PromptTemplate::render_description));
/// `context` lists the stages whose outputs are appended to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub stage: StageId,
    pub agent: StageId,
    pub description: String,
    pub expected_output: String,
    pub context: Vec<StageId>,
}

impl TaskSpec {
    /// Create a task bound to its own stage's agent, reading context from
    /// every earlier stage.
    pub fn new(
        stage: StageId,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            agent: stage,
            description: description.into(),
            expected_output: expected_output.into(),
            context: stage.predecessors().to_vec(),
        }
    }

    pub fn with_context(mut self, context: Vec<StageId>) -> Self {
        self.context = context;
        self
    }

    pub fn with_agent(mut self, agent: StageId) -> Self {
        self.agent = agent;
        self
    }
}
