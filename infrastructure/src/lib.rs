//! Infrastructure layer for codebase-architect
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider-backed agents, the local context
//! retriever, the JSONL run log and configuration file loading.

#[cfg(not(any(feature = "azure", feature = "openai", feature = "anthropic")))]
compile_error!("enable at least one provider feature: azure, openai or anthropic");

pub mod config;
pub mod context;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig};
pub use context::{ExclusionPolicy, LocalContextRetriever, RetrieverLimits};
pub use logging::JsonlRunLogger;
pub use providers::{ProviderAgent, ProviderAgentFactory, SamplingParams};
