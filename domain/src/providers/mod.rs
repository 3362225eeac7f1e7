//! Provider configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of provider settings without depending
//! on any serialization format (TOML, JSON, etc.). Credentials are either
//! given directly or read from the named environment variable when an
//! agent is constructed.

/// Top-level provider configuration.
#[derive(Debug, Clone, Default)]
pub struct ProvidersConfig {
    /// Azure OpenAI settings.
    pub azure: AzureProviderConfig,
    /// OpenAI API settings.
    pub openai: OpenAiProviderConfig,
    /// Anthropic API settings.
    pub anthropic: AnthropicProviderConfig,
}

/// Azure OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct AzureProviderConfig {
    /// Environment variable holding the resource endpoint (default: "AZURE_ENDPOINT").
    pub endpoint_env: String,
    /// Direct endpoint, takes precedence over `endpoint_env`.
    pub endpoint: Option<String>,
    /// Environment variable holding the API key (default: "AZURE_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Environment variable that overrides the deployment name (default: "AZURE_DEPLOYMENT").
    pub deployment_env: String,
    /// Explicit deployment name; falls back to the model name.
    pub deployment: Option<String>,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Use a streaming session and aggregate the chunks.
    pub stream: bool,
}

impl Default for AzureProviderConfig {
    fn default() -> Self {
        Self {
            endpoint_env: "AZURE_ENDPOINT".to_string(),
            endpoint: None,
            api_key_env: "AZURE_API_KEY".to_string(),
            api_key: None,
            deployment_env: "AZURE_DEPLOYMENT".to_string(),
            deployment: None,
            api_version: "2024-12-01-preview".to_string(),
            stream: false,
        }
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API.
    pub base_url: String,
    /// Use a streaming session and aggregate the chunks.
    pub stream: bool,
}

impl Default for OpenAiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            stream: false,
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// Token budget for extended thinking when reasoning is enabled.
    pub thinking_budget: u32,
}

impl Default for AnthropicProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_version: "2023-06-01".to_string(),
            thinking_budget: 2048,
        }
    }
}
