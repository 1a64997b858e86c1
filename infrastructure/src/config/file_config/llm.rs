//! LLM selection from TOML (`[llm]` section)

use crew_domain::Model;
use serde::{Deserialize, Serialize};

/// Providers the gateway can route to
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "anthropic"];

/// Raw LLM configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Default provider: "openai" or "anthropic" (env: `LLM_PROVIDER`)
    pub provider: String,
    /// Model every stage uses (env: `LLM_MODEL`)
    pub model: String,
    /// Per-stage completion timeout in seconds
    pub timeout_seconds: u64,
    /// Overrides the provider's max_tokens when set
    pub max_tokens: Option<u32>,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: Model::default().to_string(),
            timeout_seconds: 300,
            max_tokens: None,
        }
    }
}

impl FileLlmConfig {
    /// Lowercased, trimmed provider name
    pub fn provider_name(&self) -> String {
        self.provider.trim().to_lowercase()
    }

    pub fn parse_model(&self) -> Model {
        let Ok(model) = self.model.trim().parse::<Model>();
        model
    }
}
