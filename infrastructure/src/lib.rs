//! Infrastructure layer for review-crew
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration and crew loading, LLM
//! providers, source ingestion, report persistence and transcripts.

pub mod config;
pub mod crew;
pub mod logging;
pub mod providers;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use config::{ConfigLoadError, ConfigLoader, FileConfig};
pub use crew::{CrewLoadError, CrewLoader, LoadedCrew};
pub use logging::{JsonlConversationLogger, JsonlTranscriptFactory};
pub use providers::{
    AnthropicProviderAdapter, OpenAiProviderAdapter, ProviderAdapter, ProviderKind,
    RoutingGateway, gateway_from_config,
};
pub use report::FileReportStore;
pub use source::{GitSourceRepository, LocalSourceLoader};
