//! Writes review reports as a markdown file plus a raw-text dump.

use crew_application::ports::report_store::{ReportStore, ReportStoreError, SavedReport};
use crew_domain::Report;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Give up after this many suffixed names collide
const MAX_ATTEMPTS: u32 = 100;

#[derive(Debug, Clone)]
pub struct FileReportStore {
    default_dir: PathBuf,
}

impl FileReportStore {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
        }
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }
}

/// Create a file only if nothing exists at `path`; `Ok(None)` on collision.
fn create_exclusive(path: &Path) -> Result<Option<File>, ReportStoreError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(source) => Err(ReportStoreError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_all(mut file: impl Write, path: &Path, content: &str) -> Result<(), ReportStoreError> {
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| ReportStoreError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Fill both claimed files. On failure neither file is left behind.
fn write_pair(
    markdown: impl Write,
    markdown_path: &Path,
    raw: impl Write,
    raw_path: &Path,
    report: &Report,
) -> Result<(), ReportStoreError> {
    let written = write_all(markdown, markdown_path, &report.markdown)
        .and_then(|_| write_all(raw, raw_path, &report.raw));
    if written.is_err() {
        let _ = fs::remove_file(markdown_path);
        let _ = fs::remove_file(raw_path);
    }
    written
}

impl ReportStore for FileReportStore {
    fn save(
        &self,
        report: &Report,
        output_dir: Option<&Path>,
    ) -> Result<SavedReport, ReportStoreError> {
        let dir = output_dir.unwrap_or(&self.default_dir);
        fs::create_dir_all(dir).map_err(|source| ReportStoreError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for attempt in 0..MAX_ATTEMPTS {
            let markdown_path = dir.join(report.markdown_file_name(attempt));
            let Some(markdown_file) = create_exclusive(&markdown_path)? else {
                debug!("{} exists, trying next suffix", markdown_path.display());
                continue;
            };

            let raw_path = dir.join(report.raw_file_name(attempt));
            let raw_file = match create_exclusive(&raw_path) {
                Ok(Some(file)) => file,
                other => {
                    // Release the claimed markdown name before retrying or failing
                    drop(markdown_file);
                    let _ = fs::remove_file(&markdown_path);
                    match other {
                        Ok(_) => continue,
                        Err(e) => return Err(e),
                    }
                }
            };

            write_pair(markdown_file, &markdown_path, raw_file, &raw_path, report)?;

            info!("Report saved to {}", markdown_path.display());
            return Ok(SavedReport {
                markdown_path,
                raw_path,
            });
        }

        Err(ReportStoreError::NamesExhausted(
            report.base_name.clone(),
            MAX_ATTEMPTS,
        ))
    }
}
