//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Default max tokens per response.
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 8192,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can point at any compatible server).
    pub base_url: String,
    /// Default max tokens per response.
    pub max_tokens: u32,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// OpenAI API settings.
    pub openai: FileOpenAiConfig,
    /// Anthropic API settings.
    pub anthropic: FileAnthropicConfig,
    /// Explicit model → provider routing overrides.
    pub routing: HashMap<String, String>,
}

impl FileProvidersConfig {
    /// Resolve the API key for a provider: the inline key wins, then the
    /// configured environment variable. Blank values count as missing.
    pub fn api_key_for(
        &self,
        provider: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let (inline, env_var) = match provider {
            "openai" => (&self.openai.api_key, &self.openai.api_key_env),
            "anthropic" => (&self.anthropic.api_key, &self.anthropic.api_key_env),
            _ => return None,
        };
        inline
            .clone()
            .or_else(|| env(env_var))
            .filter(|key| !key.trim().is_empty())
    }

    /// Name of the env var holding a provider's key
    pub fn api_key_env_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "openai" => Some(&self.openai.api_key_env),
            "anthropic" => Some(&self.anthropic.api_key_env),
            _ => None,
        }
    }
}
