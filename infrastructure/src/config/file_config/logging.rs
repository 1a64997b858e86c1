//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily log file and transcripts
    pub dir: PathBuf,
    /// Write a daily rolling log file in `dir`
    pub file: bool,
    /// Write a JSONL transcript of prompts and outputs per run
    pub transcript: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: true,
            transcript: false,
        }
    }
}
