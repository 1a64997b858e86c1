//! Run Review use case
//!
//! Drives one source document through every stage of the crew, in order.

use crate::config::ReviewParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoTranscripts, TranscriptFactory,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use chrono::Local;
use crew_domain::{
    CrewDefinition, PromptTemplate, ReviewResult, SourceDocument, StageId, TaskResult,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a pipeline run. Each names the stage that failed.
#[derive(Error, Debug)]
pub enum RunReviewError {
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: StageId,
        #[source]
        source: GatewayError,
    },

    #[error("{stage} stage timed out after {}s", .timeout.as_secs_f64())]
    StageTimeout { stage: StageId, timeout: Duration },

    #[error("{stage} stage returned an empty response")]
    EmptyOutput { stage: StageId },
}

impl RunReviewError {
    pub fn stage(&self) -> StageId {
        match self {
            RunReviewError::StageFailed { stage, .. }
            | RunReviewError::StageTimeout { stage, .. }
            | RunReviewError::EmptyOutput { stage } => *stage,
        }
    }
}

static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifier stamped on every transcript event of one run: `<pid>-<seq>`.
fn next_run_id() -> String {
    format!("{}-{}", std::process::id(), RUN_SEQ.fetch_add(1, Ordering::SeqCst))
}

/// Transcript of a single run.
struct RunTranscript {
    run_id: String,
    logger: Arc<dyn ConversationLogger>,
}

impl RunTranscript {
    fn log(&self, event_type: &'static str, mut payload: Value) {
        if let Value::Object(map) = &mut payload {
            map.insert("run_id".to_string(), Value::String(self.run_id.clone()));
        }
        self.logger.log(ConversationEvent::new(event_type, payload));
    }
}

/// Use case for running the review pipeline over one document
///
/// Stateless between runs: every call builds a fresh result vector, opens
/// its own transcript and opens a fresh session per stage.
pub struct RunReviewUseCase<G: LlmGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    crew: Arc<CrewDefinition>,
    params: ReviewParams,
    transcripts: Arc<dyn TranscriptFactory>,
}

impl<G: LlmGateway + ?Sized + 'static> RunReviewUseCase<G> {
    pub fn new(gateway: Arc<G>, crew: Arc<CrewDefinition>, params: ReviewParams) -> Self {
        Self {
            gateway,
            crew,
            params,
            transcripts: Arc::new(NoTranscripts),
        }
    }

    pub fn with_transcripts(mut self, transcripts: Arc<dyn TranscriptFactory>) -> Self {
        self.transcripts = transcripts;
        self
    }

    pub fn crew(&self) -> &CrewDefinition {
        &self.crew
    }

    pub fn params(&self) -> &ReviewParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, source: &SourceDocument) -> Result<ReviewResult, RunReviewError> {
        self.execute_with_progress(source, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        source: &SourceDocument,
        progress: &dyn ProgressNotifier,
    ) -> Result<ReviewResult, RunReviewError> {
        info!(
            "Starting review of {} ({} lines, {} stages, model {})",
            source.name,
            source.line_count(),
            self.crew.stage_count(),
            self.params.model
        );
        progress.on_review_start(source, self.crew.stage_count());
        let run_id = next_run_id();
        let transcript = RunTranscript {
            logger: self.transcripts.open(&source.name, &run_id),
            run_id,
        };
        transcript.log(
            "review_started",
            json!({
                "source": source.name,
                "location": source.location,
                "files": source.files,
                "lines": source.line_count(),
                "model": self.params.model.to_string(),
            }),
        );

        let mut results: Vec<TaskResult> = Vec::with_capacity(self.crew.stage_count());

        for &stage in StageId::pipeline() {
            match self.run_stage(stage, source, &results, progress, &transcript).await {
                Ok(output) => results.push(TaskResult::new(stage, output)),
                Err(e) => {
                    warn!("Review of {} aborted: {}", source.name, e);
                    progress.on_stage_complete(stage, false);
                    progress.on_review_complete(false);
                    transcript.log(
                        "stage_failed",
                        json!({ "stage": stage.as_str(), "error": e.to_string() }),
                    );
                    return Err(e);
                }
            }
            progress.on_stage_complete(stage, true);
        }

        progress.on_review_complete(true);
        transcript.log(
            "review_completed",
            json!({ "source": source.name, "stages": results.len() }),
        );
        info!("Review of {} completed", source.name);

        Ok(ReviewResult::new(source.name.clone(), results))
    }

    async fn run_stage(
        &self,
        stage: StageId,
        source: &SourceDocument,
        previous: &[TaskResult],
        progress: &dyn ProgressNotifier,
        transcript: &RunTranscript,
    ) -> Result<String, RunReviewError> {
        let task = self.crew.task(stage);
        let agent = self.crew.agent_for_task(stage);

        // Prerequisites in pipeline order; task.context is already sorted
        let context: Vec<&TaskResult> = task
            .context
            .iter()
            .filter_map(|dep| previous.iter().find(|r| r.stage == *dep))
            .collect();

        let system_prompt = PromptTemplate::system_prompt(agent);
        let prompt = PromptTemplate::stage_prompt(task, source, &context, Local::now());

        progress.on_stage_start(stage, &agent.role);
        if agent.verbose {
            info!("[{}] {} is working ({} context sections)", stage, agent.role, context.len());
        } else {
            debug!("[{}] {} is working ({} context sections)", stage, agent.role, context.len());
        }
        transcript.log(
            "stage_prompt",
            json!({
                "stage": stage.as_str(),
                "agent": agent.role,
                "system_prompt": system_prompt,
                "prompt": prompt,
            }),
        );

        let request = async {
            let session = self
                .gateway
                .create_session_with_system_prompt(&self.params.model, &system_prompt)
                .await?;
            session.send(&prompt).await
        };

        let response = match self.params.stage_timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| RunReviewError::StageTimeout { stage, timeout })?,
            None => request.await,
        }
        .map_err(|source| RunReviewError::StageFailed { stage, source })?;

        if response.trim().is_empty() {
            return Err(RunReviewError::EmptyOutput { stage });
        }

        if agent.verbose {
            info!("[{}] completed ({} chars)", stage, response.len());
        } else {
            debug!("[{}] completed ({} chars)", stage, response.len());
        }
        transcript.log(
            "stage_output",
            json!({
                "stage": stage.as_str(),
                "agent": agent.role,
                "output": response,
            }),
        );

        Ok(response)
    }
}
