//! Domain layer for review-crew
//!
//! This crate contains the review pipeline's core types and pure logic.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Crew
//!
//! A fixed pipeline of four stages (bug detection, security, performance,
//! documentation). Each stage has an agent persona and a task; later tasks
//! read the outputs of earlier ones.
//!
//! ## Report
//!
//! The final stage's output, normalised and wrapped in a markdown header,
//! with severity markers extracted into a [`SeveritySummary`].

pub mod config;
pub mod core;
pub mod crew;
pub mod prompt;
pub mod review;
pub mod source;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, model::Model};
pub use crew::{
    agent::AgentSpec,
    definition::{CrewDefinition, CrewValidationError},
    stage::StageId,
    task::TaskSpec,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use prompt::{KNOWN_PLACEHOLDERS, PromptTemplate, PromptVars, placeholders_in};
pub use review::{
    findings::{Finding, FindingSeverity, SeveritySummary, extract_findings},
    report::{Report, normalize_output},
    result::{ReviewResult, TaskResult},
};
pub use source::{
    document::{SourceDocument, SourceFile},
    policy::SourcePolicy,
    request::{ReviewRequest, SourceOrigin, parse_file_selection},
};
