//! Raw output of a single agent call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token usage reported by a provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
        }
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for TokenUsage {
    fn sum<I: Iterator<Item = TokenUsage>>(iter: I) -> Self {
        iter.fold(TokenUsage::default(), |acc, u| acc + u)
    }
}

/// Result of one agent operation: result key → raw text.
///
/// Phase operations return a single well-known key (see
/// [`PhaseId::result_key`](crate::PhaseId::result_key)); the orchestrator
/// treats a missing key as malformed output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub outputs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl PhaseResult {
    pub fn new(key: impl Into<String>, output: impl Into<String>) -> Self {
        let mut outputs = BTreeMap::new();
        outputs.insert(key.into(), output.into());
        Self {
            outputs,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    pub fn tokens_used(&self) -> u64 {
        self.usage.map(|u| u.total()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_sum() {
        let total: TokenUsage = [TokenUsage::new(10, 5), TokenUsage::new(3, 2)]
            .into_iter()
            .sum();
        assert_eq!(total, TokenUsage::new(13, 7));
        assert_eq!(total.total(), 20);
    }

    #[test]
    fn test_phase_result_lookup() {
        let result = PhaseResult::new("plan", "analyze A then B")
            .with_usage(Some(TokenUsage::new(100, 40)));
        assert_eq!(result.get("plan"), Some("analyze A then B"));
        assert_eq!(result.get("analysis"), None);
        assert_eq!(result.tokens_used(), 140);
    }

    #[test]
    fn test_missing_usage_counts_zero() {
        assert_eq!(PhaseResult::new("analysis", "x").tokens_used(), 0);
    }
}
