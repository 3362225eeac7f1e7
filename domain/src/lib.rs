//! Domain layer for codebase-architect
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Phases
//!
//! An analysis run walks a fixed chain of phases:
//! discovery → planning → deep analysis → synthesis → consolidation → final.
//! Each phase sees the project context and the records of strictly earlier
//! phases, never later ones.
//!
//! ## Model configuration
//!
//! - **ModelConfig**: provider, model name, reasoning mode, optional temperature
//! - **PhaseRegistry**: immutable phase → ModelConfig table passed into a run

pub mod core;
pub mod model;
pub mod phase;
pub mod project;
pub mod prompt;
pub mod providers;

// Re-export commonly used types
pub use core::error::{ConfigurationError, PhaseDataError};
pub use model::{ModelConfig, PhaseRegistry, ProviderKind, ReasoningMode, presets};
pub use phase::{
    ConsolidatedReport, FinalAnalysis, PhaseId, PhaseInput, PhaseRecord, PhaseResult,
    PhaseStatus, PipelineState, ReportError, TokenUsage, UNAVAILABLE_PLACEHOLDER,
    split_sections,
};
pub use project::{
    NO_STRUCTURE_SENTINEL, PackageManagement, ProjectContext, ProjectStructure, SourceFile,
    TextEncoding, WorkspaceSummary, detect_language,
};
pub use prompt::PromptTemplate;
pub use providers::{
    AnthropicProviderConfig, AzureProviderConfig, OpenAiProviderConfig, ProvidersConfig,
};
