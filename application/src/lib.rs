//! Application layer for review-crew
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ReviewParams;
pub use ports::{
    conversation_logger::{
        ConversationEvent, ConversationLogger, NoConversationLogger, NoTranscripts,
        TranscriptFactory,
    },
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{NoProgress, ProgressNotifier},
    report_store::{ReportStore, ReportStoreError, SavedReport},
    source_loader::{IngestionError, SourceLoader},
    source_repository::SourceRepository,
};
pub use use_cases::review_source::{ReviewError, ReviewOutcome, ReviewSourceUseCase};
pub use use_cases::run_review::{RunReviewError, RunReviewUseCase};
