//! Review requests

use std::path::PathBuf;

/// Where the code under review comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// A file on the local filesystem
    LocalPath(PathBuf),
    /// An uploaded file held in memory
    Upload { filename: String, bytes: Vec<u8> },
    /// Files from a remote git repository; empty selection means "default set"
    Repository {
        repo_url: String,
        selected_files: Vec<String>,
    },
}

impl SourceOrigin {
    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            SourceOrigin::LocalPath(path) => path.display().to_string(),
            SourceOrigin::Upload { filename, .. } => format!("upload:{}", filename),
            SourceOrigin::Repository { repo_url, .. } => repo_url.clone(),
        }
    }
}

/// One review invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub origin: SourceOrigin,
    /// Overrides the configured report directory
    pub output_dir: Option<PathBuf>,
}

impl ReviewRequest {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SourceOrigin::LocalPath(path.into()),
            output_dir: None,
        }
    }

    pub fn upload(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            origin: SourceOrigin::Upload {
                filename: filename.into(),
                bytes,
            },
            output_dir: None,
        }
    }

    pub fn repository(repo_url: impl Into<String>, selected_files: Vec<String>) -> Self {
        Self {
            origin: SourceOrigin::Repository {
                repo_url: repo_url.into(),
                selected_files,
            },
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// Split a comma-joined file selection, dropping blanks.
pub fn parse_file_selection(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
