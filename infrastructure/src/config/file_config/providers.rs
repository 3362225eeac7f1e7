//! Provider configuration from TOML (`[providers]` section)

use architect_domain::{
    AnthropicProviderConfig, AzureProviderConfig, OpenAiProviderConfig, ProvidersConfig,
};
use serde::{Deserialize, Serialize};

/// Azure OpenAI provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAzureConfig {
    /// Environment variable holding the endpoint (default: "AZURE_ENDPOINT").
    pub endpoint_env: String,
    pub endpoint: Option<String>,
    /// Environment variable name for the API key (default: "AZURE_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Environment variable overriding the deployment (default: "AZURE_DEPLOYMENT").
    pub deployment_env: String,
    pub deployment: Option<String>,
    pub api_version: String,
    pub stream: bool,
}

impl Default for FileAzureConfig {
    fn default() -> Self {
        let d = AzureProviderConfig::default();
        Self {
            endpoint_env: d.endpoint_env,
            endpoint: d.endpoint,
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            deployment_env: d.deployment_env,
            deployment: d.deployment,
            api_version: d.api_version,
            stream: d.stream,
        }
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API.
    pub base_url: String,
    pub stream: bool,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        let d = OpenAiProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            stream: d.stream,
        }
    }
}

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// Extended thinking budget in tokens.
    pub thinking_budget: u32,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        let d = AnthropicProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            api_version: d.api_version,
            thinking_budget: d.thinking_budget,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub azure: FileAzureConfig,
    pub openai: FileOpenAiConfig,
    pub anthropic: FileAnthropicConfig,
}

impl FileProvidersConfig {
    pub fn to_providers_config(&self) -> ProvidersConfig {
        let azure = &self.azure;
        let openai = &self.openai;
        let anthropic = &self.anthropic;
        ProvidersConfig {
            azure: AzureProviderConfig {
                endpoint_env: azure.endpoint_env.clone(),
                endpoint: azure.endpoint.clone(),
                api_key_env: azure.api_key_env.clone(),
                api_key: azure.api_key.clone(),
                deployment_env: azure.deployment_env.clone(),
                deployment: azure.deployment.clone(),
                api_version: azure.api_version.clone(),
                stream: azure.stream,
            },
            openai: OpenAiProviderConfig {
                api_key_env: openai.api_key_env.clone(),
                api_key: openai.api_key.clone(),
                base_url: openai.base_url.clone(),
                stream: openai.stream,
            },
            anthropic: AnthropicProviderConfig {
                api_key_env: anthropic.api_key_env.clone(),
                api_key: anthropic.api_key.clone(),
                base_url: anthropic.base_url.clone(),
                api_version: anthropic.api_version.clone(),
                thinking_budget: anthropic.thinking_budget,
            },
        }
    }
}
