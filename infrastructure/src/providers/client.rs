//! Closed set of provider clients compiled into this build.

use super::openai_compat::SamplingParams;
use architect_application::{AgentError, ChatMessage, Completion};
use architect_domain::ProviderKind;

#[cfg(feature = "anthropic")]
use super::anthropic::AnthropicClient;
#[cfg(feature = "azure")]
use super::azure::AzureClient;
#[cfg(feature = "openai")]
use super::openai::OpenAiClient;

#[derive(Debug)]
pub enum ProviderClient {
    #[cfg(feature = "azure")]
    Azure(AzureClient),
    #[cfg(feature = "openai")]
    OpenAi(OpenAiClient),
    #[cfg(feature = "anthropic")]
    Anthropic(AnthropicClient),
}

impl ProviderClient {
    pub fn kind(&self) -> ProviderKind {
        match self {
            #[cfg(feature = "azure")]
            ProviderClient::Azure(_) => ProviderKind::AzureOpenAi,
            #[cfg(feature = "openai")]
            ProviderClient::OpenAi(_) => ProviderKind::OpenAi,
            #[cfg(feature = "anthropic")]
            ProviderClient::Anthropic(_) => ProviderKind::Anthropic,
        }
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<Completion, AgentError> {
        match self {
            #[cfg(feature = "azure")]
            ProviderClient::Azure(c) => c.complete(messages, params).await,
            #[cfg(feature = "openai")]
            ProviderClient::OpenAi(c) => c.complete(messages, params).await,
            #[cfg(feature = "anthropic")]
            ProviderClient::Anthropic(c) => c.complete(messages, params).await,
        }
    }
}
