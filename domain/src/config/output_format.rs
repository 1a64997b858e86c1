//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished review is printed to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full markdown report (default)
    Report,
    /// Saved paths and finding counts only
    Summary,
    /// Machine-readable outcome
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Report
    }
}
