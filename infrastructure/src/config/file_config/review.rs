//! Ingestion limits from TOML (`[review]` and `[github]` sections)

use super::string_or_list;
use crew_domain::SourcePolicy;
use serde::{Deserialize, Serialize};

/// Raw review configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// File extensions accepted for review (env: `ALLOWED_EXTENSIONS`,
    /// comma-separated)
    #[serde(deserialize_with = "string_or_list")]
    pub allowed_extensions: Vec<String>,
    /// Maximum upload / local file size in bytes (env: `MAX_UPLOAD_SIZE`)
    pub max_upload_size: u64,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        let policy = SourcePolicy::default();
        Self {
            allowed_extensions: policy.allowed_extensions,
            max_upload_size: policy.max_bytes,
        }
    }
}

impl FileReviewConfig {
    pub fn to_policy(&self) -> SourcePolicy {
        SourcePolicy::new(self.allowed_extensions.clone(), self.max_upload_size)
    }
}

/// Raw GitHub ingestion configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGithubConfig {
    /// Upper bound on an explicit file selection (env: `GITHUB_MAX_FILES`)
    pub max_files: usize,
    /// Files reviewed when none are selected (env: `GITHUB_DEFAULT_FILES`)
    pub default_files: usize,
    /// Seconds before a clone is abandoned
    pub clone_timeout_seconds: u64,
}

impl Default for FileGithubConfig {
    fn default() -> Self {
        Self {
            max_files: 50,
            default_files: 5,
            clone_timeout_seconds: 120,
        }
    }
}
