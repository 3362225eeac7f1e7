//! Agent factory port
//!
//! Resolves a phase to a ready-to-call [`Agent`]. The orchestrator only ever
//! sees `Box<dyn Agent>`, never a concrete provider type.

use super::agent::Agent;
use architect_domain::{ConfigurationError, PhaseId, ProviderKind};
use thiserror::Error;

/// Errors raised while constructing an agent
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Provider {provider} for {phase} is not compiled into this build")]
    UnsupportedProvider {
        phase: PhaseId,
        provider: ProviderKind,
    },
}

/// Caller-supplied values that take precedence over registry defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOverrides {
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl AgentOverrides {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: &AgentOverrides) -> Self {
        Self {
            system_prompt: self.system_prompt.or_else(|| fallback.system_prompt.clone()),
            max_tokens: self.max_tokens.or(fallback.max_tokens),
            top_p: self.top_p.or(fallback.top_p),
        }
    }
}

/// Factory for per-phase agents
pub trait AgentFactory: Send + Sync {
    /// Build the agent for `phase`.
    ///
    /// Fails with [`FactoryError::Configuration`] when the phase has no entry
    /// or credentials are missing, and with [`FactoryError::UnsupportedProvider`]
    /// when the resolved provider has no variant in this build.
    fn get_agent(
        &self,
        phase: PhaseId,
        overrides: &AgentOverrides,
    ) -> Result<Box<dyn Agent>, FactoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_prefers_own_values() {
        let specific = AgentOverrides::default().with_top_p(0.5);
        let fallback = AgentOverrides::default()
            .with_top_p(0.9)
            .with_max_tokens(1024);
        let merged = specific.or(&fallback);
        assert_eq!(merged.top_p, Some(0.5));
        assert_eq!(merged.max_tokens, Some(1024));
        assert!(merged.system_prompt.is_none());
    }

    #[test]
    fn test_unsupported_provider_message() {
        let err = FactoryError::UnsupportedProvider {
            phase: PhaseId::Phase2,
            provider: ProviderKind::Gemini,
        };
        let msg = err.to_string();
        assert!(msg.contains("phase2"));
        assert!(msg.contains("not compiled"));
    }
}
