//! Anthropic Messages API client.

use super::http::{mask_api_key, resolve_setting, status_error, transport_error};
use super::openai_compat::SamplingParams;
use architect_application::{AgentError, ChatMessage, ChatRole, Completion};
use architect_domain::{
    AnthropicProviderConfig, ConfigurationError, ProviderKind, ReasoningMode, TokenUsage,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Smallest thinking budget the API accepts.
const MIN_THINKING_BUDGET: u32 = 1024;

pub struct AnthropicClient {
    http: Client,
    api_key: String,
    base_url: String,
    api_version: String,
    model: String,
    thinking_budget: Option<u32>,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("thinking_budget", &self.thinking_budget)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<Thinking>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(
        http: Client,
        config: &AnthropicProviderConfig,
        model: &str,
        reasoning_mode: ReasoningMode,
    ) -> Result<Self, ConfigurationError> {
        let api_key = resolve_setting(
            config.api_key.as_deref(),
            &config.api_key_env,
            ProviderKind::Anthropic,
        )?;
        let base = config.thinking_budget.max(MIN_THINKING_BUDGET);
        let thinking_budget = match reasoning_mode {
            ReasoningMode::Enabled | ReasoningMode::Medium => Some(base),
            ReasoningMode::Low => Some(MIN_THINKING_BUDGET),
            ReasoningMode::High => Some(base.saturating_mul(4)),
            ReasoningMode::Disabled | ReasoningMode::Temperature => None,
        };
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: model.to_string(),
            thinking_budget,
        })
    }

    pub fn url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn request_body<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        params: &SamplingParams,
    ) -> MessagesRequest<'a> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .collect();
        let wire = messages
            .iter()
            .filter_map(|m| match m.role {
                ChatRole::System => None,
                ChatRole::User => Some(WireMessage {
                    role: "user",
                    content: &m.content,
                }),
                ChatRole::Assistant => Some(WireMessage {
                    role: "assistant",
                    content: &m.content,
                }),
            })
            .collect();

        let thinking = self.thinking_budget.map(|budget_tokens| Thinking {
            kind: "enabled",
            budget_tokens,
        });
        // max_tokens must leave room above the thinking budget
        let max_tokens = match self.thinking_budget {
            Some(budget) => params.max_tokens.max(budget.saturating_add(MIN_THINKING_BUDGET)),
            None => params.max_tokens,
        };

        MessagesRequest {
            model: &self.model,
            max_tokens,
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: wire,
            temperature: if thinking.is_some() { None } else { params.temperature },
            top_p: if thinking.is_some() { None } else { params.top_p },
            thinking,
        }
    }

    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<Completion, AgentError> {
        let provider = ProviderKind::Anthropic;
        let response = self
            .http
            .post(self.url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&self.request_body(messages, params))
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(provider, e))?;
        if !status.is_success() {
            return Err(status_error(provider, status, &headers, &body));
        }
        parse_response(&body)
    }
}

/// Join the text blocks; thinking blocks are dropped.
fn parse_response(body: &str) -> Result<Completion, AgentError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::MalformedResponse(format!("Anthropic: {}", e)))?;

    let texts: Vec<String> = response
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text)
        .collect();
    if texts.is_empty() {
        return Err(AgentError::MalformedResponse(
            "Anthropic: response has no text content".to_string(),
        ));
    }

    let mut completion = Completion::new(texts.join(""));
    completion.usage = response
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens));
    Ok(completion)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(mode: ReasoningMode) -> AnthropicClient {
        let config = AnthropicProviderConfig {
            api_key_env: "ARCHITECT_TEST_NEVER_SET_ANTHROPIC_KEY".into(),
            api_key: Some("sk-ant-0123456789".into()),
            ..Default::default()
        };
        AnthropicClient::new(Client::new(), &config, "claude-sonnet-4-5", mode).unwrap()
    }

    #[test]
    fn test_system_prompt_is_separate() {
        let client = client(ReasoningMode::Temperature);
        let messages = [ChatMessage::system("be precise"), ChatMessage::user("hi")];
        let params = SamplingParams {
            temperature: Some(0.2),
            ..Default::default()
        };
        let body = serde_json::to_value(client.request_body(&messages, &params)).unwrap();

        assert_eq!(body["system"], "be precise");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("thinking").is_none());
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn test_enabled_reasoning_sends_thinking() {
        let client = client(ReasoningMode::Enabled);
        let messages = [ChatMessage::user("hi")];
        let body =
            serde_json::to_value(client.request_body(&messages, &SamplingParams::default()))
                .unwrap();

        assert_eq!(body["thinking"]["type"], "enabled");
        assert_eq!(body["thinking"]["budget_tokens"], 2048);
        assert!(body.get("temperature").is_none());
        assert!(body.get("top_p").is_none());
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_parse_response_skips_thinking_blocks() {
        let body = r###"{"content":[{"type":"thinking","thinking":"hmm"},
                                  {"type":"text","text":"## Result"}],
                       "usage":{"input_tokens":50,"output_tokens":10}}"###;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.text, "## Result");
        assert_eq!(completion.usage, Some(TokenUsage::new(50, 10)));
    }

    #[test]
    fn test_parse_response_without_text() {
        let err = parse_response(r#"{"content":[]}"#).unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }
}
