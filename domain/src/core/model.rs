//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// LLM models a review can run against (Value Object)
///
/// Known names get their own variant so provider routing can infer the
/// family; anything else is carried through as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI models
    Gpt5,
    Gpt5Mini,
    Gpt5Nano,
    Gpt41,
    Gpt41Mini,
    Gpt4o,
    Gpt4oMini,
    // Anthropic models
    ClaudeOpus41,
    ClaudeSonnet45,
    ClaudeSonnet4,
    ClaudeHaiku45,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the provider-facing identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt5 => "gpt-5",
            Model::Gpt5Mini => "gpt-5-mini",
            Model::Gpt5Nano => "gpt-5-nano",
            Model::Gpt41 => "gpt-4.1",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::ClaudeOpus41 => "claude-opus-4-1",
            Model::ClaudeSonnet45 => "claude-sonnet-4-5",
            Model::ClaudeSonnet4 => "claude-sonnet-4-0",
            Model::ClaudeHaiku45 => "claude-haiku-4-5",
            Model::Custom(s) => s,
        }
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        match self {
            Model::ClaudeOpus41
            | Model::ClaudeSonnet45
            | Model::ClaudeSonnet4
            | Model::ClaudeHaiku45 => true,
            Model::Custom(name) => name.starts_with("claude"),
            _ => false,
        }
    }

    /// Check if this is an OpenAI model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt5
            | Model::Gpt5Mini
            | Model::Gpt5Nano
            | Model::Gpt41
            | Model::Gpt41Mini
            | Model::Gpt4o
            | Model::Gpt4oMini => true,
            Model::Custom(name) => {
                name.starts_with("gpt-")
                    || name.starts_with("o1")
                    || name.starts_with("o3")
                    || name.starts_with("o4")
            }
            _ => false,
        }
    }
}

impl Default for Model {
    /// Returns the default model (gpt-5-nano)
    fn default() -> Self {
        Model::Gpt5Nano
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-5" => Model::Gpt5,
            "gpt-5-mini" => Model::Gpt5Mini,
            "gpt-5-nano" => Model::Gpt5Nano,
            "gpt-4.1" => Model::Gpt41,
            "gpt-4.1-mini" => Model::Gpt41Mini,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "claude-opus-4-1" => Model::ClaudeOpus41,
            "claude-sonnet-4-5" => Model::ClaudeSonnet45,
            "claude-sonnet-4-0" => Model::ClaudeSonnet4,
            "claude-haiku-4-5" => Model::ClaudeHaiku45,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // FromStr is infallible: unknown names become Custom
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
