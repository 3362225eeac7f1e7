//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Conversion into domain and application types happens here, after
//! [`FileConfig::validate`] has reported every problem at once.

mod behavior;
mod context;
mod output;
mod phases;
mod providers;

pub use behavior::FileBehaviorConfig;
pub use context::FileContextConfig;
pub use output::FileOutputConfig;
pub use phases::{FilePhaseConfig, FilePhasesConfig};
pub use providers::{FileAnthropicConfig, FileAzureConfig, FileOpenAiConfig, FileProvidersConfig};

use architect_application::RunPolicy;
use architect_domain::{PhaseRegistry, ProvidersConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A problem found while validating a [`FileConfig`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("phases.{0}: unknown phase (expected phase1..phase5 or final)")]
    UnknownPhase(String),

    #[error("phases.{phase}: {reason}")]
    InvalidPhase { phase: String, reason: String },

    #[error("{field}: invalid value '{value}' (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

/// `top_p` must lie in (0, 1].
pub(super) fn check_top_p(field: &str, top_p: Option<f32>) -> Option<ConfigValidationError> {
    let top_p = top_p?;
    (!(top_p > 0.0 && top_p <= 1.0)).then(|| ConfigValidationError::InvalidValue {
        field: field.to_string(),
        value: top_p.to_string(),
        expected: "a number in (0, 1]".to_string(),
    })
}

pub(super) fn check_max_tokens(field: &str, max_tokens: Option<u32>) -> Option<ConfigValidationError> {
    (max_tokens? == 0).then(|| ConfigValidationError::InvalidValue {
        field: field.to_string(),
        value: "0".to_string(),
        expected: "at least 1".to_string(),
    })
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Phase → model bindings layered over the built-in table
    pub phases: FilePhasesConfig,
    pub providers: FileProvidersConfig,
    pub behavior: FileBehaviorConfig,
    pub context: FileContextConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = self.phases.validate();

        if let Some(format) = &self.output.format
            && !["markdown", "md", "json", "both"].contains(&format.to_ascii_lowercase().as_str())
        {
            issues.push(ConfigValidationError::InvalidValue {
                field: "output.format".to_string(),
                value: format.clone(),
                expected: "markdown, json or both".to_string(),
            });
        }

        issues.extend(check_top_p("behavior.top_p", self.behavior.top_p));
        issues.extend(check_max_tokens("behavior.max_tokens", self.behavior.max_tokens));

        if self.behavior.max_attempts == 0 {
            issues.push(ConfigValidationError::InvalidValue {
                field: "behavior.max_attempts".to_string(),
                value: "0".to_string(),
                expected: "at least 1".to_string(),
            });
        }

        if self.context.max_files == 0 {
            issues.push(ConfigValidationError::InvalidValue {
                field: "context.max_files".to_string(),
                value: "0".to_string(),
                expected: "at least 1".to_string(),
            });
        }

        issues
    }

    pub fn to_registry(&self) -> Result<PhaseRegistry, ConfigValidationError> {
        self.phases.to_registry()
    }

    pub fn to_providers_config(&self) -> ProvidersConfig {
        self.providers.to_providers_config()
    }

    /// Run policy from `[behavior]` plus per-phase overrides from `[phases]`.
    pub fn to_run_policy(&self) -> RunPolicy {
        self.phases
            .overrides()
            .into_iter()
            .fold(self.behavior.to_run_policy(), |policy, (phase, overrides)| {
                policy.with_phase_override(phase, overrides)
            })
    }
}
