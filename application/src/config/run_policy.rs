//! Run policy: retry, timeout and phase-data handling for one analysis run.
//!
//! [`RunPolicy`] groups the knobs [`RunAnalysisUseCase`](crate::use_cases::run_analysis::RunAnalysisUseCase)
//! consults at the orchestrator boundary. These are application-layer
//! concerns, not domain policy.

use crate::ports::agent_factory::AgentOverrides;
use architect_domain::PhaseId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What to do when a phase returns output without its expected key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseDataPolicy {
    /// Record a placeholder, mark the phase degraded and keep going.
    #[default]
    Lenient,
    /// Fail the run with the offending phase.
    Strict,
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per phase call, first attempt included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every further attempt.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after a rate-limit error.
    pub rate_limit_multiplier: u32,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            rate_limit_multiplier: 4,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before attempt `attempt + 1`, given that `attempt` (1-based) failed.
    ///
    /// A server-provided `retry_after` wins over the computed delay when longer.
    pub fn delay_after(
        &self,
        attempt: u32,
        rate_limited: bool,
        retry_after: Option<Duration>,
    ) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let mut delay = self.base_delay.saturating_mul(1u32 << exponent);
        if rate_limited {
            delay = delay.saturating_mul(self.rate_limit_multiplier.max(1));
        }
        if let Some(after) = retry_after {
            delay = delay.max(after);
        }
        delay.min(self.max_delay)
    }
}

/// Policy for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct RunPolicy {
    pub retry: RetryPolicy,
    /// Bounded wait for every provider call.
    pub call_timeout: Option<Duration>,
    pub phase_data: PhaseDataPolicy,
    /// Applied to every phase unless a per-phase override exists.
    pub default_overrides: AgentOverrides,
    pub phase_overrides: BTreeMap<PhaseId, AgentOverrides>,
}

impl RunPolicy {
    // ==================== Builder Methods ====================

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_phase_data(mut self, policy: PhaseDataPolicy) -> Self {
        self.phase_data = policy;
        self
    }

    pub fn with_default_overrides(mut self, overrides: AgentOverrides) -> Self {
        self.default_overrides = overrides;
        self
    }

    pub fn with_phase_override(mut self, phase: PhaseId, overrides: AgentOverrides) -> Self {
        self.phase_overrides.insert(phase, overrides);
        self
    }

    /// Overrides in effect for `phase`: per-phase values over the run defaults.
    pub fn overrides_for(&self, phase: PhaseId) -> AgentOverrides {
        match self.phase_overrides.get(&phase) {
            Some(specific) => specific.clone().or(&self.default_overrides),
            None => self.default_overrides.clone(),
        }
    }
}
