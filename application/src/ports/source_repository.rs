//! Remote repository port

use super::source_loader::IngestionError;
use async_trait::async_trait;
use crew_domain::{SourceDocument, SourceFile};

/// Access to reviewable files in a remote repository.
///
/// Each call works on a fresh checkout; nothing is cached between calls.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Reviewable files, sorted by path. An empty repository yields an empty list.
    async fn list_files(&self, repo_url: &str) -> Result<Vec<SourceFile>, IngestionError>;

    /// Combine the selected files (or the default set when `selected` is
    /// empty) into one document.
    async fn fetch(
        &self,
        repo_url: &str,
        selected: &[String],
    ) -> Result<SourceDocument, IngestionError>;
}
