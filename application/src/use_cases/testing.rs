//! Test doubles shared by the use case tests.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use async_trait::async_trait;
use crew_domain::{AgentSpec, CrewDefinition, Model, StageId, TaskSpec};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = dyn Fn(usize, &str, &str) -> Result<String, GatewayError> + Send + Sync;

/// One recorded `send` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub prompt: String,
}

/// Gateway whose sessions answer through a closure and record every prompt.
///
/// The closure receives the zero-based call index, the system prompt and
/// the user prompt.
pub struct ScriptedGateway {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new(
        responder: impl Fn(usize, &str, &str) -> Result<String, GatewayError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Answers `O1`, `O2`, ... in call order.
    pub fn numbered() -> Self {
        Self::new(|idx, _, _| Ok(format!("O{}", idx + 1)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

struct ScriptedSession {
    system_prompt: String,
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Option<Duration>,
}

#[async_trait]
impl LlmSession for ScriptedSession {
    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let idx = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                system_prompt: self.system_prompt.clone(),
                prompt: content.to_string(),
            });
            calls.len() - 1
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(idx, &self.system_prompt, content)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_session_with_system_prompt(
        &self,
        _model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(ScriptedSession {
            system_prompt: system_prompt.to_string(),
            responder: Arc::clone(&self.responder),
            calls: Arc::clone(&self.calls),
            delay: self.delay,
        }))
    }
}

/// A minimal valid four-stage crew.
pub fn sample_crew() -> Arc<CrewDefinition> {
    let agents = StageId::pipeline()
        .iter()
        .map(|s| {
            AgentSpec::new(
                *s,
                format!("{} Specialist", s.display_name()),
                "Find problems",
                "Reviewer",
            )
        })
        .collect();
    let tasks = StageId::pipeline()
        .iter()
        .map(|s| {
            TaskSpec::new(
                *s,
                format!("Stage {} for {{code_file_name}}:\n{{code_content}}", s.as_str()),
                "Findings with severity and line numbers",
            )
        })
        .collect();
    Arc::new(CrewDefinition::new(agents, tasks).unwrap())
}
