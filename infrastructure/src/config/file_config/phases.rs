//! Per-phase model bindings from TOML (`[phases.<id>]` sections)

use super::{ConfigValidationError, check_max_tokens, check_top_p};
use architect_application::AgentOverrides;
use architect_domain::{ModelConfig, PhaseId, PhaseRegistry, ProviderKind, ReasoningMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `[phases.<id>]` table. Unset fields fall back to the built-in binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePhaseConfig {
    /// "azure", "openai", "anthropic", ...
    pub provider: Option<String>,
    pub model: Option<String>,
    /// "disabled", "enabled", "low", "medium", "high" or "temperature"
    pub reasoning: Option<String>,
    pub temperature: Option<f32>,
    /// Replaces the phase's built-in system prompt.
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl FilePhaseConfig {
    /// Resolve against the built-in `base` binding.
    fn to_model_config(
        &self,
        phase: PhaseId,
        base: &ModelConfig,
    ) -> Result<ModelConfig, ConfigValidationError> {
        let invalid = |reason: String| ConfigValidationError::InvalidPhase {
            phase: phase.as_str().to_string(),
            reason,
        };

        let provider = match &self.provider {
            Some(raw) => raw
                .parse::<ProviderKind>()
                .map_err(|e| invalid(e.to_string()))?,
            None => base.provider(),
        };
        let rebound = self.provider.is_some() || self.model.is_some();
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| base.model_name().to_string());

        let reasoning = match &self.reasoning {
            Some(raw) => raw
                .parse::<ReasoningMode>()
                .map_err(|e| invalid(e.to_string()))?,
            None if self.temperature.is_some() => ReasoningMode::Temperature,
            None if !rebound => base.reasoning_mode(),
            None => ReasoningMode::Disabled,
        };
        let temperature = match self.temperature {
            Some(t) => Some(t),
            None if reasoning == ReasoningMode::Temperature => base.temperature(),
            None => None,
        };

        ModelConfig::new(provider, model, reasoning, temperature).map_err(|e| invalid(e.to_string()))
    }

    fn overrides(&self) -> Option<AgentOverrides> {
        let overrides = AgentOverrides {
            system_prompt: self.system_prompt.clone(),
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        };
        (overrides != AgentOverrides::default()).then_some(overrides)
    }
}

/// `[phases]` keyed by phase id (`phase1` … `phase5`, `final`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilePhasesConfig(pub BTreeMap<String, FilePhaseConfig>);

impl FilePhasesConfig {
    fn parsed(&self) -> Vec<(Result<PhaseId, ConfigValidationError>, &FilePhaseConfig)> {
        self.0
            .iter()
            .map(|(key, cfg)| {
                let id = key
                    .parse::<PhaseId>()
                    .map_err(|_| ConfigValidationError::UnknownPhase(key.clone()));
                (id, cfg)
            })
            .collect()
    }

    /// Overlay the configured phases on the built-in registry.
    pub fn to_registry(&self) -> Result<PhaseRegistry, ConfigValidationError> {
        let mut registry = PhaseRegistry::default();
        for (id, cfg) in self.parsed() {
            let phase = id?;
            let base = registry
                .resolve(phase)
                .map_err(|e| ConfigValidationError::InvalidPhase {
                    phase: phase.as_str().to_string(),
                    reason: e.to_string(),
                })?;
            registry = registry.with_phase(phase, cfg.to_model_config(phase, &base)?);
        }
        Ok(registry)
    }

    /// Per-phase agent overrides; unknown phase keys are skipped.
    pub fn overrides(&self) -> BTreeMap<PhaseId, AgentOverrides> {
        self.parsed()
            .into_iter()
            .filter_map(|(id, cfg)| Some((id.ok()?, cfg.overrides()?)))
            .collect()
    }

    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let defaults = PhaseRegistry::default();
        let mut issues = Vec::new();
        for (id, cfg) in self.parsed() {
            let phase = match id {
                Ok(phase) => phase,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };
            if let Ok(base) = defaults.resolve(phase) {
                issues.extend(cfg.to_model_config(phase, &base).err());
            }
            let field = |name: &str| format!("phases.{}.{}", phase, name);
            issues.extend(check_top_p(&field("top_p"), cfg.top_p));
            issues.extend(check_max_tokens(&field("max_tokens"), cfg.max_tokens));
        }
        issues
    }
}
