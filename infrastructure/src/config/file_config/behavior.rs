//! Run behavior from TOML (`[behavior]` section)

use architect_application::{AgentOverrides, PhaseDataPolicy, RetryPolicy, RunPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for each provider call (0 disables it)
    pub timeout_seconds: Option<u64>,
    /// Attempts per phase call, first attempt included
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub rate_limit_multiplier: u32,
    /// Fail the run instead of recording a placeholder for unusable output
    pub strict_phase_data: bool,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(120),
            max_attempts: 3,
            backoff_ms: 1000,
            max_backoff_ms: 60_000,
            rate_limit_multiplier: 4,
            strict_phase_data: false,
            max_tokens: None,
            top_p: None,
        }
    }
}

impl FileBehaviorConfig {
    pub fn to_run_policy(&self) -> RunPolicy {
        let retry = RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.backoff_ms),
            rate_limit_multiplier: self.rate_limit_multiplier,
            max_delay: Duration::from_millis(self.max_backoff_ms),
        };
        let phase_data = if self.strict_phase_data {
            PhaseDataPolicy::Strict
        } else {
            PhaseDataPolicy::Lenient
        };
        RunPolicy::default()
            .with_retry(retry)
            .with_call_timeout(
                self.timeout_seconds
                    .filter(|s| *s > 0)
                    .map(Duration::from_secs),
            )
            .with_phase_data(phase_data)
            .with_default_overrides(AgentOverrides {
                system_prompt: None,
                max_tokens: self.max_tokens,
                top_p: self.top_p,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = FileBehaviorConfig::default().to_run_policy();
        assert_eq!(policy.retry.max_attempts, 3);
        assert_eq!(policy.retry.base_delay, Duration::from_secs(1));
        assert_eq!(policy.call_timeout, Some(Duration::from_secs(120)));
        assert_eq!(policy.phase_data, PhaseDataPolicy::Lenient);
    }

    #[test]
    fn test_zero_timeout_and_strict() {
        let behavior = FileBehaviorConfig {
            timeout_seconds: Some(0),
            max_attempts: 0,
            strict_phase_data: true,
            max_tokens: Some(2000),
            ..Default::default()
        };
        let policy = behavior.to_run_policy();
        assert_eq!(policy.call_timeout, None);
        assert_eq!(policy.retry.max_attempts, 1);
        assert_eq!(policy.phase_data, PhaseDataPolicy::Strict);
        assert_eq!(policy.default_overrides.max_tokens, Some(2000));
    }
}
