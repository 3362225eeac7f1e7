//! Per-phase model binding.
//!
//! [`ModelConfig`] is a validated value object: once built it cannot hold a
//! temperature without temperature-driven sampling, or the reverse.

use super::provider::ProviderKind;
use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Provider-specific reasoning knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningMode {
    Disabled,
    Enabled,
    Low,
    Medium,
    High,
    /// Plain sampling driven by the configured temperature.
    Temperature,
}

impl ReasoningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningMode::Disabled => "disabled",
            ReasoningMode::Enabled => "enabled",
            ReasoningMode::Low => "low",
            ReasoningMode::Medium => "medium",
            ReasoningMode::High => "high",
            ReasoningMode::Temperature => "temperature",
        }
    }

    /// Discrete effort level, if this mode selects one.
    pub fn effort(&self) -> Option<&'static str> {
        match self {
            ReasoningMode::Low => Some("low"),
            ReasoningMode::Medium => Some("medium"),
            ReasoningMode::High => Some("high"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReasoningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReasoningMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(ReasoningMode::Disabled),
            "enabled" | "on" => Ok(ReasoningMode::Enabled),
            "low" => Ok(ReasoningMode::Low),
            "medium" => Ok(ReasoningMode::Medium),
            "high" => Ok(ReasoningMode::High),
            "temperature" => Ok(ReasoningMode::Temperature),
            _ => Err(ConfigurationError::UnknownReasoningMode(s.to_string())),
        }
    }
}

/// Model binding for one phase: `(provider, model, reasoning mode, temperature)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelConfig")]
pub struct ModelConfig {
    provider: ProviderKind,
    model_name: String,
    reasoning_mode: ReasoningMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ModelConfig {
    /// Build a config, enforcing `temperature.is_some() == (reasoning_mode == Temperature)`.
    pub fn new(
        provider: ProviderKind,
        model_name: impl Into<String>,
        reasoning_mode: ReasoningMode,
        temperature: Option<f32>,
    ) -> Result<Self, ConfigurationError> {
        let model_name = model_name.into();
        if model_name.trim().is_empty() {
            return Err(ConfigurationError::EmptyModelName);
        }
        match (reasoning_mode, temperature) {
            (ReasoningMode::Temperature, None) => return Err(ConfigurationError::MissingTemperature),
            (ReasoningMode::Temperature, Some(t)) if !(0.0..=2.0).contains(&t) => {
                return Err(ConfigurationError::TemperatureOutOfRange(t));
            }
            (mode, Some(_)) if mode != ReasoningMode::Temperature => {
                return Err(ConfigurationError::UnexpectedTemperature(
                    mode.as_str().to_string(),
                ));
            }
            _ => {}
        }
        Ok(Self {
            provider,
            model_name,
            reasoning_mode,
            temperature,
        })
    }

    /// Temperature-driven sampling.
    pub fn sampled(
        provider: ProviderKind,
        model_name: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            provider,
            model_name,
            ReasoningMode::Temperature,
            Some(temperature),
        )
    }

    /// A reasoning mode other than temperature-driven sampling.
    pub fn reasoning(
        provider: ProviderKind,
        model_name: impl Into<String>,
        mode: ReasoningMode,
    ) -> Result<Self, ConfigurationError> {
        Self::new(provider, model_name, mode, None)
    }

    /// Literal bindings for the preset table; checked by the preset tests.
    pub(super) fn preset(
        provider: ProviderKind,
        model_name: &'static str,
        reasoning_mode: ReasoningMode,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            provider,
            model_name: model_name.to_string(),
            reasoning_mode,
            temperature,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn reasoning_mode(&self) -> ReasoningMode {
        self.reasoning_mode
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.temperature {
            Some(t) => write!(f, "{}/{} (t={})", self.provider, self.model_name, t),
            None => write!(
                f,
                "{}/{} (reasoning={})",
                self.provider, self.model_name, self.reasoning_mode
            ),
        }
    }
}

#[derive(Deserialize)]
struct RawModelConfig {
    provider: ProviderKind,
    model_name: String,
    reasoning_mode: ReasoningMode,
    #[serde(default)]
    temperature: Option<f32>,
}

impl TryFrom<RawModelConfig> for ModelConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawModelConfig) -> Result<Self, Self::Error> {
        ModelConfig::new(
            raw.provider,
            raw.model_name,
            raw.reasoning_mode,
            raw.temperature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_requires_temperature_mode() {
        let err = ModelConfig::new(
            ProviderKind::AzureOpenAi,
            "gpt-4o",
            ReasoningMode::High,
            Some(0.3),
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::UnexpectedTemperature("high".into()));
    }

    #[test]
    fn test_temperature_mode_requires_value() {
        let err = ModelConfig::new(
            ProviderKind::AzureOpenAi,
            "gpt-4o",
            ReasoningMode::Temperature,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingTemperature);
    }

    #[test]
    fn test_rejects_out_of_range_and_empty_name() {
        assert!(ModelConfig::sampled(ProviderKind::OpenAi, "gpt-4.1", 3.5).is_err());
        assert_eq!(
            ModelConfig::sampled(ProviderKind::OpenAi, "  ", 0.5).unwrap_err(),
            ConfigurationError::EmptyModelName
        );
    }

    #[test]
    fn test_valid_configs() {
        let sampled = ModelConfig::sampled(ProviderKind::AzureOpenAi, "gpt-4o", 0.7).unwrap();
        assert_eq!(sampled.temperature(), Some(0.7));
        assert_eq!(sampled.reasoning_mode(), ReasoningMode::Temperature);

        let reasoning =
            ModelConfig::reasoning(ProviderKind::OpenAi, "o3-mini", ReasoningMode::High).unwrap();
        assert_eq!(reasoning.temperature(), None);
        assert_eq!(reasoning.reasoning_mode().effort(), Some("high"));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ModelConfig = serde_json::from_str(
            r#"{"provider":"anthropic","model_name":"claude-sonnet-4","reasoning_mode":"enabled"}"#,
        )
        .unwrap();
        assert_eq!(ok.provider(), ProviderKind::Anthropic);

        let bad = serde_json::from_str::<ModelConfig>(
            r#"{"provider":"anthropic","model_name":"claude","reasoning_mode":"enabled","temperature":0.2}"#,
        );
        assert!(bad.is_err());
    }
}
