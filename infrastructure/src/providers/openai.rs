//! OpenAI API client.

use super::http::{mask_api_key, resolve_setting};
use super::openai_compat::{ChatRequest, SamplingParams, send_chat};
use architect_application::{AgentError, ChatMessage, Completion};
use architect_domain::{ConfigurationError, OpenAiProviderConfig, ProviderKind};
use reqwest::Client;

pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    stream: bool,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("stream", &self.stream)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(
        http: Client,
        config: &OpenAiProviderConfig,
        model: &str,
    ) -> Result<Self, ConfigurationError> {
        let api_key = resolve_setting(
            config.api_key.as_deref(),
            &config.api_key_env,
            ProviderKind::OpenAi,
        )?;
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            stream: config.stream,
        })
    }

    pub fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<Completion, AgentError> {
        let body = ChatRequest::new(Some(&self.model), messages, params, self.stream);
        let request = self
            .http
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&body);
        send_chat(ProviderKind::OpenAi, request, self.stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_direct_key() {
        let config = OpenAiProviderConfig {
            api_key_env: "ARCHITECT_TEST_NEVER_SET_OPENAI_KEY".into(),
            api_key: Some("sk-test-0123456789".into()),
            base_url: "http://localhost:8080/".into(),
            ..Default::default()
        };
        let client = OpenAiClient::new(Client::new(), &config, "gpt-4.1").unwrap();
        assert_eq!(client.url(), "http://localhost:8080/v1/chat/completions");
        assert!(!format!("{:?}", client).contains("0123456789"));
    }

    #[test]
    fn test_missing_key() {
        let config = OpenAiProviderConfig {
            api_key_env: "ARCHITECT_TEST_NEVER_SET_OPENAI_KEY".into(),
            ..Default::default()
        };
        let err = OpenAiClient::new(Client::new(), &config, "gpt-4.1").unwrap_err();
        assert!(err.to_string().contains("ARCHITECT_TEST_NEVER_SET_OPENAI_KEY"));
    }
}
