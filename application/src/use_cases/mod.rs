//! Use cases
//!
//! - [`gather_context`]: build the project context from the retriever port
//! - [`run_analysis`]: drive the phase pipeline over that context

pub mod gather_context;
pub mod run_analysis;
pub(crate) mod shared;
