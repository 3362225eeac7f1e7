//! Phase → model binding table.
//!
//! The registry is an explicit immutable value handed to whoever needs it
//! (usually behind an `Arc`), never process-global state. Runs with different
//! tables can coexist in one process.

use super::model_config::ModelConfig;
use super::presets;
use crate::core::error::ConfigurationError;
use crate::phase::PhaseId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRegistry {
    entries: BTreeMap<PhaseId, ModelConfig>,
}

impl PhaseRegistry {
    /// An empty table. Every lookup fails until phases are bound.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (PhaseId, ModelConfig)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Bind every phase to the same model.
    pub fn uniform(config: ModelConfig) -> Self {
        Self::from_entries(PhaseId::ALL.into_iter().map(|p| (p, config.clone())))
    }

    /// Return a copy with `phase` rebound to `config`.
    pub fn with_phase(mut self, phase: PhaseId, config: ModelConfig) -> Self {
        self.entries.insert(phase, config);
        self
    }

    /// Return a copy without a binding for `phase`.
    pub fn without_phase(mut self, phase: PhaseId) -> Self {
        self.entries.remove(&phase);
        self
    }

    pub fn resolve(&self, phase: PhaseId) -> Result<ModelConfig, ConfigurationError> {
        self.entries
            .get(&phase)
            .cloned()
            .ok_or(ConfigurationError::MissingPhase(phase))
    }

    /// Resolve by textual identifier (`"phase1"` … `"phase5"`, `"final"`).
    pub fn resolve_name(&self, phase: &str) -> Result<ModelConfig, ConfigurationError> {
        self.resolve(phase.parse()?)
    }

    /// Fail on the first pipeline phase that has no binding.
    pub fn ensure_complete(&self) -> Result<(), ConfigurationError> {
        match PhaseId::ALL.into_iter().find(|p| !self.entries.contains_key(p)) {
            Some(missing) => Err(ConfigurationError::MissingPhase(missing)),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseId, &ModelConfig)> {
        self.entries.iter().map(|(p, c)| (*p, c))
    }
}

impl Default for PhaseRegistry {
    /// Azure GPT-4o table: precise discovery and final analysis, creative
    /// consolidation, default sampling in between.
    fn default() -> Self {
        Self::from_entries([
            (PhaseId::Phase1, presets::azure_gpt4o_precise()),
            (PhaseId::Phase2, presets::azure_gpt4o_default()),
            (PhaseId::Phase3, presets::azure_gpt4o_default()),
            (PhaseId::Phase4, presets::azure_gpt4o_default()),
            (PhaseId::Phase5, presets::azure_gpt4o_creative()),
            (PhaseId::Final, presets::azure_gpt4o_precise()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderKind;

    #[test]
    fn test_default_table_is_complete() {
        let registry = PhaseRegistry::default();
        assert!(registry.ensure_complete().is_ok());
        assert_eq!(
            registry.resolve(PhaseId::Phase5).unwrap().temperature(),
            Some(0.9)
        );
        assert_eq!(
            registry.resolve(PhaseId::Final).unwrap().temperature(),
            Some(0.3)
        );
    }

    #[test]
    fn test_absent_phase_never_defaults() {
        let registry = PhaseRegistry::default().without_phase(PhaseId::Phase4);
        for phase in PhaseId::ALL {
            let result = registry.resolve(phase);
            if phase == PhaseId::Phase4 {
                assert_eq!(result, Err(ConfigurationError::MissingPhase(PhaseId::Phase4)));
            } else {
                assert!(result.is_ok());
            }
        }
        assert_eq!(
            registry.ensure_complete(),
            Err(ConfigurationError::MissingPhase(PhaseId::Phase4))
        );
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let registry = PhaseRegistry::empty();
        for phase in PhaseId::ALL {
            assert!(matches!(
                registry.resolve(phase),
                Err(ConfigurationError::MissingPhase(p)) if p == phase
            ));
        }
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        let registry = PhaseRegistry::default();
        for name in ["phase0", "phase6", "", "discovery"] {
            assert!(matches!(
                registry.resolve_name(name),
                Err(ConfigurationError::UnknownPhase(_))
            ));
        }
        assert!(registry.resolve_name("phase2").is_ok());
    }

    #[test]
    fn test_rebinding_leaves_original_untouched() {
        let original = PhaseRegistry::default();
        let rebound = original
            .clone()
            .with_phase(PhaseId::Final, presets::claude_with_reasoning());
        assert_eq!(
            rebound.resolve(PhaseId::Final).unwrap().provider(),
            ProviderKind::Anthropic
        );
        assert_eq!(
            original.resolve(PhaseId::Final).unwrap().provider(),
            ProviderKind::AzureOpenAi
        );
    }
}
