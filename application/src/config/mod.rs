//! Application-level configuration.
//!
//! - [`RunPolicy`]: retries, call timeout, phase-data policy and agent overrides

pub mod run_policy;

pub use run_policy::{PhaseDataPolicy, RetryPolicy, RunPolicy};
