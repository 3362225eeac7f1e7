//! Model configuration: vendors, reasoning modes, presets and the phase registry.

pub mod model_config;
pub mod presets;
pub mod provider;
pub mod registry;

pub use model_config::{ModelConfig, ReasoningMode};
pub use provider::ProviderKind;
pub use registry::PhaseRegistry;
