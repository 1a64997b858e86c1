//! Port for structured transcript logging.
//!
//! Defines the [`ConversationLogger`] trait for recording review events
//! (stage prompts, stage outputs, failures) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! prompt/response transcript in a machine-readable format (JSONL).

use serde_json::Value;
use std::sync::Arc;

/// A structured transcript event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The logger adds the timestamp.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "stage_prompt", "stage_output").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; write failures are dropped so the
/// review itself never fails because of transcript I/O.
pub trait ConversationLogger: Send + Sync {
    /// Record a transcript event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

/// Opens one transcript per review run.
///
/// Concurrent runs (e.g. HTTP requests) each get their own logger so
/// their events never interleave in a single file.
pub trait TranscriptFactory: Send + Sync {
    /// Open the transcript for a run over `source_name`, identified by `run_id`.
    fn open(&self, source_name: &str, run_id: &str) -> Arc<dyn ConversationLogger>;
}

/// Factory that hands out [`NoConversationLogger`]s.
pub struct NoTranscripts;

impl TranscriptFactory for NoTranscripts {
    fn open(&self, _source_name: &str, _run_id: &str) -> Arc<dyn ConversationLogger> {
        Arc::new(NoConversationLogger)
    }
}
