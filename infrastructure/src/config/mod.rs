//! Configuration file loading for codebase-architect
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ARCHITECT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./architect.toml` or `./.architect.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/codebase-architect/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnthropicConfig, FileAzureConfig, FileBehaviorConfig, FileConfig,
    FileContextConfig, FileOpenAiConfig, FileOutputConfig, FilePhaseConfig, FilePhasesConfig,
    FileProvidersConfig,
};
pub use loader::ConfigLoader;
