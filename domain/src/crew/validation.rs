//! Configuration validation issues.
//!
//! Crew definitions and the application config file are validated once at
//! load time. Problems are reported as structured [`ConfigIssue`]s with a
//! severity so callers can decide what is fatal.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A pipeline stage has no agent definition.
    MissingAgent { stage: String },
    /// A pipeline stage has no task definition.
    MissingTask { stage: String },
    /// The same stage is defined twice.
    DuplicateDefinition { stage: String },
    /// A definition key does not name a known stage.
    UnknownStage { key: String },
    /// A task reads context from itself or from a later stage.
    InvalidContext { stage: String, dependency: String },
    /// A required text field is empty.
    EmptyField { field: String },
    /// A task description uses a placeholder that is never filled in.
    UnknownPlaceholder { stage: String, placeholder: String },
    /// An enum-like string field holds an unsupported value.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// An API key required by the selected provider is not available.
    MissingApiKey { provider: String, env_var: String },
    /// A numeric field is outside its allowed range.
    InvalidValue { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Returns `true` if any issue in the slice is an error.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
