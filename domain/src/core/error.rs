//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Source is empty: {0}")]
    EmptySource(String),

    #[error("Unsupported file type: {name} (allowed: {allowed})")]
    UnsupportedExtension { name: String, allowed: String },

    #[error("File too large: {name} is {size} bytes (limit {limit})")]
    SourceTooLarge { name: String, size: u64, limit: u64 },

    #[error("File is not valid UTF-8 text: {0}")]
    NotUtf8(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),
}

impl DomainError {
    /// Check if this error was caused by the content of the input
    /// rather than its name or size.
    pub fn is_content_error(&self) -> bool {
        matches!(self, DomainError::EmptySource(_) | DomainError::NotUtf8(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_display() {
        let error = DomainError::UnsupportedExtension {
            name: "notes.txt".to_string(),
            allowed: ".py".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported file type: notes.txt (allowed: .py)"
        );
    }

    #[test]
    fn test_is_content_error() {
        assert!(DomainError::EmptySource("a.py".to_string()).is_content_error());
        assert!(DomainError::NotUtf8("a.py".to_string()).is_content_error());
        assert!(!DomainError::UnknownStage("x".to_string()).is_content_error());
    }
}
