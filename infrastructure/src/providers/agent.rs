//! Provider-backed [`Agent`] implementation.

use super::client::ProviderClient;
use super::openai_compat::SamplingParams;
use architect_application::{Agent, AgentError, ChatMessage, Completion};
use architect_domain::{ModelConfig, PhaseId, ProviderKind, ReasoningMode};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

/// Agent bound to one phase, one model and one client.
#[derive(Debug)]
pub struct ProviderAgent {
    phase: PhaseId,
    config: ModelConfig,
    client: ProviderClient,
    sampling: SamplingParams,
    system_prompt: String,
}

impl ProviderAgent {
    pub fn new(
        phase: PhaseId,
        config: ModelConfig,
        client: ProviderClient,
        sampling: SamplingParams,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            config,
            client,
            sampling,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }
}

#[async_trait]
impl Agent for ProviderAgent {
    fn provider(&self) -> ProviderKind {
        self.client.kind()
    }

    fn model(&self) -> &str {
        self.config.model_name()
    }

    fn reasoning_mode(&self) -> ReasoningMode {
        self.config.reasoning_mode()
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<Completion, AgentError> {
        let start = Instant::now();
        let result = self.client.complete(messages, &self.sampling).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(completion) => info!(
                phase = %self.phase,
                provider = %self.provider(),
                model = %self.model(),
                elapsed_ms,
                tokens = completion.usage.map(|u| u.total()).unwrap_or(0),
                "Provider call completed"
            ),
            Err(e) => warn!(
                phase = %self.phase,
                provider = %self.provider(),
                model = %self.model(),
                elapsed_ms,
                error = %e,
                "Provider call failed"
            ),
        }
        result
    }
}
