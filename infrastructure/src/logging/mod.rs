//! Logging infrastructure: structured review transcripts.
//!
//! Operational logs go through `tracing`; this module only covers the
//! machine-readable JSONL transcript of prompts and stage outputs.

pub mod jsonl_logger;

pub use jsonl_logger::{JsonlConversationLogger, JsonlTranscriptFactory};
