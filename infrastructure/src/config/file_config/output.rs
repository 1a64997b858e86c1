//! Output configuration from TOML (`[output]` section)

use crew_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Console format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Directory for saved reports
    pub dir: PathBuf,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            dir: PathBuf::from("reports"),
        }
    }
}
