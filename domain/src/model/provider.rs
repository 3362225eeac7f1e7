//! LLM vendor identifiers.

use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// LLM vendors a phase can be bound to.
///
/// Not every vendor has an agent variant in every build; the agent factory
/// rejects those with an unsupported-provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AzureOpenAi,
    OpenAi,
    Anthropic,
    Gemini,
    DeepSeek,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::AzureOpenAi => "azure_open_ai",
            ProviderKind::OpenAi => "open_ai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::DeepSeek => "deep_seek",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::AzureOpenAi => "Azure OpenAI",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigurationError;

    /// Accepts the serialized names plus common spellings (`azure`, `openai`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azure" | "azure_openai" | "azure_open_ai" | "azure-openai" => {
                Ok(ProviderKind::AzureOpenAi)
            }
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "deepseek" | "deep_seek" => Ok(ProviderKind::DeepSeek),
            _ => Err(ConfigurationError::UnknownProvider(s.to_string())),
        }
    }
}
