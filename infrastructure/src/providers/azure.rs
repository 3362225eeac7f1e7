//! Azure OpenAI client.

use super::http::{mask_api_key, optional_setting, resolve_setting};
use super::openai_compat::{ChatRequest, SamplingParams, send_chat};
use architect_application::{AgentError, ChatMessage, Completion};
use architect_domain::{AzureProviderConfig, ConfigurationError, ProviderKind};
use reqwest::Client;

/// Client bound to one Azure deployment.
pub struct AzureClient {
    http: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    stream: bool,
}

impl std::fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("stream", &self.stream)
            .finish()
    }
}

impl AzureClient {
    /// Resolve endpoint, key and deployment.
    ///
    /// The deployment comes from the env override, then the config, then
    /// `model_name`.
    pub fn new(
        http: Client,
        config: &AzureProviderConfig,
        model_name: &str,
    ) -> Result<Self, ConfigurationError> {
        let endpoint = resolve_setting(
            config.endpoint.as_deref(),
            &config.endpoint_env,
            ProviderKind::AzureOpenAi,
        )?;
        let api_key = resolve_setting(
            config.api_key.as_deref(),
            &config.api_key_env,
            ProviderKind::AzureOpenAi,
        )?;
        let deployment = optional_setting(None, &config.deployment_env)
            .or_else(|| config.deployment.clone())
            .unwrap_or_else(|| model_name.to_string());

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version: config.api_version.clone(),
            stream: config.stream,
        })
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<Completion, AgentError> {
        let body = ChatRequest::new(None, messages, params, self.stream);
        let request = self
            .http
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&body);
        send_chat(ProviderKind::AzureOpenAi, request, self.stream).await
    }
}
