//! Application layer for codebase-architect
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PhaseDataPolicy, RetryPolicy, RunPolicy};
pub use ports::{
    agent::{Agent, AgentError, ChatMessage, ChatRole, Completion, invoke_phase},
    agent_factory::{AgentFactory, AgentOverrides, FactoryError},
    context_retriever::{ContextError, ContextRetriever},
    progress::{AnalysisProgress, CompositeProgress, NoProgress},
};
pub use use_cases::gather_context::{GatherContextInput, GatherContextUseCase};
pub use use_cases::run_analysis::{
    AnalysisOutput, RunAnalysisError, RunAnalysisInput, RunAnalysisUseCase,
};
