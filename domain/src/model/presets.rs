//! Predefined model bindings that registry tables are assembled from.

use super::model_config::{ModelConfig, ReasoningMode};
use super::provider::ProviderKind;

const CLAUDE_SONNET: &str = "claude-3-7-sonnet-20250219";

fn sampled(provider: ProviderKind, model: &'static str, temperature: f32) -> ModelConfig {
    ModelConfig::preset(provider, model, ReasoningMode::Temperature, Some(temperature))
}

fn reasoning(provider: ProviderKind, model: &'static str, mode: ReasoningMode) -> ModelConfig {
    ModelConfig::preset(provider, model, mode, None)
}

// ==================== Azure OpenAI ====================

/// Balanced GPT-4o deployment (temperature 0.7).
pub fn azure_gpt4o_default() -> ModelConfig {
    sampled(ProviderKind::AzureOpenAi, "gpt-4o", 0.7)
}

/// Exploratory GPT-4o deployment (temperature 0.9).
pub fn azure_gpt4o_creative() -> ModelConfig {
    sampled(ProviderKind::AzureOpenAi, "gpt-4o", 0.9)
}

/// Low-temperature GPT-4o deployment for discovery and final synthesis.
pub fn azure_gpt4o_precise() -> ModelConfig {
    sampled(ProviderKind::AzureOpenAi, "gpt-4o", 0.3)
}

pub fn azure_gpt4_turbo() -> ModelConfig {
    sampled(ProviderKind::AzureOpenAi, "gpt-4-turbo", 0.7)
}

// ==================== OpenAI ====================

pub fn openai_gpt41_default() -> ModelConfig {
    sampled(ProviderKind::OpenAi, "gpt-4.1", 0.7)
}

pub fn openai_o3_mini_high() -> ModelConfig {
    reasoning(ProviderKind::OpenAi, "o3-mini", ReasoningMode::High)
}

// ==================== Anthropic ====================

pub fn claude_with_reasoning() -> ModelConfig {
    reasoning(ProviderKind::Anthropic, CLAUDE_SONNET, ReasoningMode::Enabled)
}

pub fn claude_basic() -> ModelConfig {
    reasoning(ProviderKind::Anthropic, CLAUDE_SONNET, ReasoningMode::Disabled)
}
