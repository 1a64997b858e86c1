//! Source loading port
//!
//! Reading local files and fetching repositories both fail with
//! [`IngestionError`], which always surfaces before any LLM call.

use async_trait::async_trait;
use crew_domain::{DomainError, SourceDocument};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a request into a [`SourceDocument`]
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("git executable not found on PATH")]
    GitUnavailable,

    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    #[error("No matching files found in {0}")]
    NoMatchingFiles(String),

    #[error("Too many files selected: {selected} (maximum {max})")]
    TooManyFiles { selected: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl IngestionError {
    /// True when the source exists but holds nothing reviewable
    pub fn is_not_found(&self) -> bool {
        matches!(self, IngestionError::NoMatchingFiles(_))
    }
}

/// Loads a single source file from the local filesystem
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load_path(&self, path: &Path) -> Result<SourceDocument, IngestionError>;
}
