//! [`AgentFactory`] backed by HTTP provider clients.

use super::agent::ProviderAgent;
use super::client::ProviderClient;
use super::openai_compat::SamplingParams;
use architect_application::{Agent, AgentFactory, AgentOverrides, FactoryError};
use architect_domain::{
    ConfigurationError, ModelConfig, PhaseId, PhaseRegistry, PromptTemplate, ProviderKind,
    ProvidersConfig,
};
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// Builds one [`ProviderAgent`] per phase from an immutable registry.
///
/// Credentials are resolved each time an agent is built; nothing is cached
/// between runs.
pub struct ProviderAgentFactory {
    registry: Arc<PhaseRegistry>,
    providers: ProvidersConfig,
    http: Client,
}

impl ProviderAgentFactory {
    pub fn new(
        registry: Arc<PhaseRegistry>,
        providers: ProvidersConfig,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::with_client(
            registry,
            providers,
            super::http::build_client()?,
        ))
    }

    pub fn with_client(
        registry: Arc<PhaseRegistry>,
        providers: ProvidersConfig,
        http: Client,
    ) -> Self {
        Self {
            registry,
            providers,
            http,
        }
    }

    /// Concrete agent for `phase`.
    pub fn build_agent(
        &self,
        phase: PhaseId,
        overrides: &AgentOverrides,
    ) -> Result<ProviderAgent, FactoryError> {
        let config = self.registry.resolve(phase)?;
        let client = self.client_for(phase, &config)?;

        let defaults = SamplingParams::default();
        let sampling = SamplingParams {
            max_tokens: overrides.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: config.temperature(),
            top_p: overrides.top_p.or(defaults.top_p),
            reasoning_effort: config.reasoning_mode().effort(),
        };
        let system_prompt = overrides
            .system_prompt
            .clone()
            .unwrap_or_else(|| PromptTemplate::system(phase).to_string());

        debug!(
            phase = %phase,
            provider = %config.provider(),
            model = %config.model_name(),
            reasoning = %config.reasoning_mode(),
            "Built agent"
        );
        Ok(ProviderAgent::new(
            phase,
            config,
            client,
            sampling,
            system_prompt,
        ))
    }

    fn client_for(
        &self,
        phase: PhaseId,
        config: &ModelConfig,
    ) -> Result<ProviderClient, FactoryError> {
        let http = self.http.clone();
        let model = config.model_name();
        match config.provider() {
            #[cfg(feature = "azure")]
            ProviderKind::AzureOpenAi => Ok(ProviderClient::Azure(
                super::azure::AzureClient::new(http, &self.providers.azure, model)?,
            )),
            #[cfg(feature = "openai")]
            ProviderKind::OpenAi => Ok(ProviderClient::OpenAi(
                super::openai::OpenAiClient::new(http, &self.providers.openai, model)?,
            )),
            #[cfg(feature = "anthropic")]
            ProviderKind::Anthropic => {
                Ok(ProviderClient::Anthropic(super::anthropic::AnthropicClient::new(
                    http,
                    &self.providers.anthropic,
                    model,
                    config.reasoning_mode(),
                )?))
            }
            #[allow(unreachable_patterns)]
            provider => {
                let _ = (http, model);
                Err(FactoryError::UnsupportedProvider { phase, provider })
            }
        }
    }
}

impl AgentFactory for ProviderAgentFactory {
    fn get_agent(
        &self,
        phase: PhaseId,
        overrides: &AgentOverrides,
    ) -> Result<Box<dyn Agent>, FactoryError> {
        Ok(Box::new(self.build_agent(phase, overrides)?))
    }
}
