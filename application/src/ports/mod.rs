//! Port definitions
//!
//! Interfaces the application layer consumes; adapters live in the
//! infrastructure and presentation layers.

pub mod agent;
pub mod agent_factory;
pub mod context_retriever;
pub mod progress;
