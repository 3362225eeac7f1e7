//! HTTP plumbing shared by the provider clients.

use architect_application::AgentError;
use architect_domain::{ConfigurationError, ProviderKind};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Build the HTTP client shared by every agent of a run.
pub fn build_client() -> Result<Client, ConfigurationError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ConfigurationError::InvalidSetting {
            name: "http client".to_string(),
            reason: e.to_string(),
        })
}

/// Resolve a setting from its direct value or the named environment variable.
///
/// Read once, when the agent is built.
pub fn resolve_setting(
    direct: Option<&str>,
    env_name: &str,
    provider: ProviderKind,
) -> Result<String, ConfigurationError> {
    if let Some(value) = direct.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    std::env::var(env_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigurationError::MissingCredential {
            provider: provider.display_name().to_string(),
            name: env_name.to_string(),
        })
}

/// Like [`resolve_setting`], but absence is fine.
pub fn optional_setting(direct: Option<&str>, env_name: &str) -> Option<String> {
    direct
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(env_name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Mask API key for safe display
pub fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

/// Keep provider error bodies short and free of credentials.
pub fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("api-key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }

    const MAX_LEN: usize = 300;
    if error.chars().count() <= MAX_LEN {
        return error.to_string();
    }
    let truncated: String = error.chars().take(MAX_LEN).collect();
    format!("{}...", truncated)
}

/// Parse a `Retry-After` header given in seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Map a non-success HTTP status to the agent error taxonomy.
pub fn status_error(
    provider: ProviderKind,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> AgentError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Authentication {
            provider,
            message: format!("HTTP {}", status.as_u16()),
        },
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited {
            provider,
            retry_after: retry_after(headers),
        },
        StatusCode::REQUEST_TIMEOUT => AgentError::ProviderCall(format!(
            "{} returned HTTP 408",
            provider.display_name()
        )),
        s if s.is_client_error() => AgentError::InvalidRequest {
            provider,
            status: s.as_u16(),
            message: sanitize_api_error(body),
        },
        _ => AgentError::ProviderCall(format!(
            "{} returned HTTP {}: {}",
            provider.display_name(),
            status.as_u16(),
            sanitize_api_error(body)
        )),
    }
}

/// Map a transport failure.
pub fn transport_error(provider: ProviderKind, error: reqwest::Error) -> AgentError {
    if error.is_decode() {
        AgentError::MalformedResponse(format!("{}: {}", provider.display_name(), error))
    } else {
        AgentError::ProviderCall(format!(
            "{} request failed: {}",
            provider.display_name(),
            error.without_url()
        ))
    }
}
