//! Ingestion policy (Value Object)

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default upload limit: 10 MiB
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Which files may be reviewed, and how large they may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePolicy {
    /// Extensions including the leading dot, e.g. `.py`
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".py".to_string()],
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl SourcePolicy {
    pub fn new(allowed_extensions: Vec<String>, max_bytes: u64) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|ext| normalize_extension(&ext))
            .filter(|ext| ext.len() > 1)
            .collect();
        Self {
            allowed_extensions,
            max_bytes,
        }
    }

    /// Whether a file name or relative path carries an allowed extension.
    pub fn allows(&self, name: &str) -> bool {
        let Some(ext) = extension_of(name) else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    }

    pub fn check_name(&self, name: &str) -> Result<(), DomainError> {
        if self.allows(name) {
            Ok(())
        } else {
            Err(DomainError::UnsupportedExtension {
                name: name.to_string(),
                allowed: self.allowed_extensions.join(", "),
            })
        }
    }

    pub fn check_size(&self, name: &str, size: u64) -> Result<(), DomainError> {
        if size > self.max_bytes {
            Err(DomainError::SourceTooLarge {
                name: name.to_string(),
                size,
                limit: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }
}

/// Extension of the last path component, with its leading dot.
pub fn extension_of(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let idx = file.rfind('.')?;
    // ".bashrc" style names have no extension
    if idx == 0 || idx + 1 == file.len() {
        return None;
    }
    Some(file[idx..].to_string())
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_lowercase()
    } else {
        format!(".{}", ext.to_lowercase())
    }
}
