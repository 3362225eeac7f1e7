//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ConfigurationError`]: fatal static-configuration problems
//! - [`error::PhaseDataError`]: recoverable malformed phase output

pub mod error;
