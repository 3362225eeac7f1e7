//! Domain error types

use crate::phase::PhaseId;
use thiserror::Error;

/// Static configuration or credential problems.
///
/// Always fatal: these surface before any billable provider request is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown phase identifier: '{0}'")]
    UnknownPhase(String),

    #[error("No model configuration found for phase '{0}'")]
    MissingPhase(PhaseId),

    #[error("Unknown provider: '{0}'")]
    UnknownProvider(String),

    #[error("Unknown reasoning mode: '{0}'")]
    UnknownReasoningMode(String),

    #[error("Model name cannot be empty")]
    EmptyModelName,

    #[error("Temperature must be set when reasoning mode is 'temperature'")]
    MissingTemperature,

    #[error("Temperature is only allowed with reasoning mode 'temperature' (got '{0}')")]
    UnexpectedTemperature(String),

    #[error("Temperature {0} is outside the supported range 0.0..=2.0")]
    TemperatureOutOfRange(f32),

    #[error("Missing required setting {name} for {provider}")]
    MissingCredential { provider: String, name: String },

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: String, reason: String },
}

/// A phase produced output the orchestrator cannot use.
///
/// Recoverable: depending on the run policy the phase is recorded with a
/// placeholder or the run fails with this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseDataError {
    #[error("{phase} result is missing expected key '{key}'")]
    MissingKey { phase: PhaseId, key: String },

    #[error("{phase} result for key '{key}' is empty")]
    EmptyOutput { phase: PhaseId, key: String },
}

impl PhaseDataError {
    pub fn phase(&self) -> PhaseId {
        match self {
            PhaseDataError::MissingKey { phase, .. } | PhaseDataError::EmptyOutput { phase, .. } => {
                *phase
            }
        }
    }
}
