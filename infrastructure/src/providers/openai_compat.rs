//! Chat Completions wire format shared by Azure OpenAI and OpenAI.

use super::http::{status_error, transport_error};
use architect_application::{AgentError, ChatMessage, Completion};
use architect_domain::{ProviderKind, TokenUsage};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sampling parameters resolved for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// `low` / `medium` / `high` for reasoning models
    pub reasoning_effort: Option<&'static str>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: None,
            top_p: Some(0.95),
            reasoning_effort: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StreamOptions {
    pub include_usage: bool,
}

impl<'a> ChatRequest<'a> {
    /// Reasoning models take `max_completion_tokens` and reject sampling knobs.
    pub fn new(
        model: Option<&'a str>,
        messages: &'a [ChatMessage],
        params: &SamplingParams,
        stream: bool,
    ) -> Self {
        let reasoning = params.reasoning_effort.is_some();
        Self {
            model,
            messages,
            max_tokens: (!reasoning).then_some(params.max_tokens),
            max_completion_tokens: reasoning.then_some(params.max_tokens),
            temperature: if reasoning { None } else { params.temperature },
            top_p: if reasoning { None } else { params.top_p },
            reasoning_effort: params.reasoning_effort,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl From<Usage> for TokenUsage {
    fn from(usage: Usage) -> Self {
        TokenUsage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Delta {
    pub content: Option<String>,
}

/// Extract the completion from a non-streaming response body.
pub(crate) fn parse_response(
    provider: ProviderKind,
    body: &str,
) -> Result<Completion, AgentError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        AgentError::MalformedResponse(format!("{}: {}", provider.display_name(), e))
    })?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            AgentError::MalformedResponse(format!(
                "{}: response has no choices",
                provider.display_name()
            ))
        })?;

    let mut completion = Completion::new(text);
    completion.usage = response.usage.map(TokenUsage::from);
    Ok(completion)
}

/// Accumulates streamed chunks into one completion.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    text: String,
    usage: Option<TokenUsage>,
}

impl StreamAccumulator {
    /// Feed one SSE `data:` payload. Returns `false` on the `[DONE]` marker.
    pub fn push(&mut self, data: &str) -> bool {
        let data = data.trim();
        if data == "[DONE]" {
            return false;
        }
        match serde_json::from_str::<ChatChunk>(data) {
            Ok(chunk) => {
                if let Some(content) = chunk.choices.first().and_then(|c| c.delta.content.as_deref())
                {
                    self.text.push_str(content);
                }
                if let Some(usage) = chunk.usage {
                    self.usage = Some(usage.into());
                }
            }
            Err(e) => warn!("Failed to parse SSE chunk: {}", e),
        }
        true
    }

    pub fn finish(self) -> Completion {
        Completion {
            text: self.text,
            usage: self.usage,
        }
    }
}

/// Send a prepared request and read back the completion.
pub(crate) async fn send_chat(
    provider: ProviderKind,
    request: RequestBuilder,
    stream: bool,
) -> Result<Completion, AgentError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(provider, status, &headers, &body));
    }

    if !stream {
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(provider, e))?;
        return parse_response(provider, &body);
    }

    let mut events = response
        .bytes_stream()
        .map(|r| r.map_err(std::io::Error::other))
        .eventsource();
    let mut acc = StreamAccumulator::default();
    while let Some(event) = events.next().await {
        let event = event
            .map_err(|e| AgentError::ProviderCall(format!("SSE error: {}", e)))?;
        if !acc.push(&event.data) {
            break;
        }
    }
    debug!(provider = %provider, "Stream finished");
    Ok(acc.finish())
}
