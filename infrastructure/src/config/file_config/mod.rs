//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod llm;
mod logging;
mod output;
mod providers;
mod review;
mod server;

pub use llm::{FileLlmConfig, KNOWN_PROVIDERS};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use providers::{FileAnthropicConfig, FileOpenAiConfig, FileProvidersConfig};
pub use review::{FileGithubConfig, FileReviewConfig};
pub use server::FileServerConfig;

use crew_application::ReviewParams;
use crew_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Deserializer, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider and model selection
    pub llm: FileLlmConfig,
    /// Provider endpoints and credentials
    pub providers: FileProvidersConfig,
    /// Accepted files and size limits
    pub review: FileReviewConfig,
    /// Report and console output
    pub output: FileOutputConfig,
    /// HTTP server
    pub server: FileServerConfig,
    /// Repository ingestion limits
    pub github: FileGithubConfig,
    /// Log files and transcripts
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate against the process environment.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// `env` resolves environment variables so API key presence can be
    /// checked without touching the real environment in tests.
    pub fn validate_with(&self, env: impl Fn(&str) -> Option<String>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Provider selection and credentials
        let provider = self.llm.provider_name();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidEnumValue {
                    field: "llm.provider".to_string(),
                    value: self.llm.provider.clone(),
                    valid_values: KNOWN_PROVIDERS.iter().map(|p| p.to_string()).collect(),
                },
                format!(
                    "llm.provider: unknown provider '{}' (expected one of: {})",
                    self.llm.provider,
                    KNOWN_PROVIDERS.join(", ")
                ),
            ));
        } else if self.providers.api_key_for(&provider, &env).is_none() {
            let env_var = self
                .providers
                .api_key_env_for(&provider)
                .unwrap_or_default()
                .to_string();
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey {
                    provider: provider.clone(),
                    env_var: env_var.clone(),
                },
                format!(
                    "{} API key not found: set {} or providers.{}.api_key",
                    provider, env_var, provider
                ),
            ));
        }

        for (model, target) in &self.providers.routing {
            let target = target.trim().to_lowercase();
            if !KNOWN_PROVIDERS.contains(&target.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("providers.routing.{}", model),
                        value: target.clone(),
                        valid_values: KNOWN_PROVIDERS.iter().map(|p| p.to_string()).collect(),
                    },
                    format!(
                        "providers.routing.{}: unknown provider '{}', route ignored",
                        model, target
                    ),
                ));
            }
        }

        // 2. Required values
        if self.llm.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyField {
                    field: "llm.model".to_string(),
                },
                "llm.model cannot be empty",
            ));
        }
        if self.review.to_policy().allowed_extensions.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyField {
                    field: "review.allowed_extensions".to_string(),
                },
                "review.allowed_extensions must list at least one extension",
            ));
        }

        // 3. Numeric ranges
        for (field, is_zero) in [
            ("llm.timeout_seconds", self.llm.timeout_seconds == 0),
            ("review.max_upload_size", self.review.max_upload_size == 0),
            ("github.max_files", self.github.max_files == 0),
            ("github.default_files", self.github.default_files == 0),
            ("github.clone_timeout_seconds", self.github.clone_timeout_seconds == 0),
        ] {
            if is_zero {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: field.to_string(),
                    },
                    format!("{} cannot be 0", field),
                ));
            }
        }
        if self.github.default_files > self.github.max_files {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue {
                    field: "github.default_files".to_string(),
                },
                format!(
                    "github.default_files ({}) exceeds github.max_files ({})",
                    self.github.default_files, self.github.max_files
                ),
            ));
        }

        issues
    }

    /// Pipeline parameters derived from `[llm]`.
    pub fn review_params(&self) -> ReviewParams {
        ReviewParams::default()
            .with_model(self.llm.parse_model())
            .with_timeout_seconds(self.llm.timeout_seconds)
    }
}

/// Accept either a TOML array or a comma-separated string.
///
/// Environment overrides arrive as plain strings, e.g. `CORS_ORIGINS=a,b`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(String::from).collect(),
        StringOrList::Many(v) => v,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
