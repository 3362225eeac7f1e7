//! LLM provider adapters.
//!
//! Each provider is a plain HTTP client; [`ProviderAgent`] wraps one of them
//! behind the application's `Agent` port and [`ProviderAgentFactory`] builds
//! agents from a phase registry.

pub mod agent;
pub mod client;
pub mod factory;
pub mod http;
pub mod openai_compat;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "azure")]
pub mod azure;
#[cfg(feature = "openai")]
pub mod openai;

pub use agent::ProviderAgent;
pub use client::ProviderClient;
pub use factory::ProviderAgentFactory;
pub use openai_compat::SamplingParams;
