//! Agent port
//!
//! Defines the uniform capability every provider-backed agent exposes.
//! Implementations (adapters) live in the infrastructure layer.

use architect_domain::{
    ConfigurationError, PhaseId, PhaseInput, PhaseResult, PromptTemplate, ProviderKind,
    ReasoningMode, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors an agent call can produce
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: ProviderKind,
        message: String,
    },

    #[error("Rate limited by {provider}")]
    RateLimited {
        provider: ProviderKind,
        retry_after: Option<Duration>,
    },

    #[error("Provider call failed: {0}")]
    ProviderCall(String),

    /// Request rejected by the provider (HTTP 4xx); resending it fails the same way.
    #[error("Request rejected by {provider} (HTTP {status}): {message}")]
    InvalidRequest {
        provider: ProviderKind,
        status: u16,
        message: String,
    },

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl AgentError {
    /// Transport failures, timeouts, malformed responses and rate limits.
    pub fn is_provider_call_error(&self) -> bool {
        matches!(
            self,
            AgentError::ProviderCall(_)
                | AgentError::Timeout(_)
                | AgentError::MalformedResponse(_)
                | AgentError::RateLimited { .. }
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AgentError::RateLimited { .. })
    }

    /// Whether the orchestrator may try the call again.
    pub fn is_retryable(&self) -> bool {
        self.is_provider_call_error()
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AgentError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message sent to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Text returned by one provider round trip
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A provider-backed agent bound to one phase of one run.
///
/// Implementors provide [`send`](Agent::send); the phase operations build
/// their prompt from [`PromptTemplate`] and issue exactly one `send`. An
/// agent holds no state across calls, so any operation can be retried.
#[async_trait]
pub trait Agent: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Model (or deployment) identifier
    fn model(&self) -> &str;

    fn reasoning_mode(&self) -> ReasoningMode;

    fn system_prompt(&self) -> &str;

    /// One round trip to the provider
    async fn send(&self, messages: &[ChatMessage]) -> Result<Completion, AgentError>;

    /// Single-shot analysis of an arbitrary JSON context, under `"analysis"`
    async fn analyze(&self, context: &serde_json::Value) -> Result<PhaseResult, AgentError> {
        let messages = [
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(PromptTemplate::analyze(context)),
        ];
        let completion = self.send(&messages).await?;
        Ok(PhaseResult::new("analysis", completion.text).with_usage(completion.usage))
    }

    /// Phase 1 under `"analysis"`
    async fn discover(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Phase 2 under `"plan"`
    async fn plan(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Phase 3 under `"analysis"`
    async fn deep_analyze(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Phase 4 under `"synthesis"`
    async fn synthesize(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Phase 5 under `"consolidated_report"`
    async fn consolidate(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Final phase under `"final_analysis"`
    async fn finalize(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        self.run_phase(input).await
    }

    /// Build the prompt for `input.phase`, send it, and key the result.
    async fn run_phase(&self, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
        let messages = [
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(PromptTemplate::user(input)),
        ];
        let completion = self.send(&messages).await?;
        Ok(PhaseResult::new(input.phase.result_key(), completion.text)
            .with_usage(completion.usage))
    }
}

/// Dispatch to the operation that belongs to `input.phase`.
pub async fn invoke_phase(agent: &dyn Agent, input: &PhaseInput) -> Result<PhaseResult, AgentError> {
    match input.phase {
        PhaseId::Phase1 => agent.discover(input).await,
        PhaseId::Phase2 => agent.plan(input).await,
        PhaseId::Phase3 => agent.deep_analyze(input).await,
        PhaseId::Phase4 => agent.synthesize(input).await,
        PhaseId::Phase5 => agent.consolidate(input).await,
        PhaseId::Final => agent.finalize(input).await,
    }
}
