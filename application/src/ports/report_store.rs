//! Report persistence port

use crew_domain::Report;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportStoreError {
    #[error("Cannot create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free file name for report {0} after {1} attempts")]
    NamesExhausted(String, u32),

    #[error("Report writer task failed: {0}")]
    Task(String),
}

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub markdown_path: PathBuf,
    pub raw_path: PathBuf,
}

/// Persists finished reports. Never overwrites an existing report.
pub trait ReportStore: Send + Sync {
    /// Save into `output_dir`, or the store's default directory when `None`.
    fn save(&self, report: &Report, output_dir: Option<&Path>)
    -> Result<SavedReport, ReportStoreError>;
}
