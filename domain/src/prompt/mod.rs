//! Prompt domain
//!
//! Templates for the system and user prompts of each analysis phase.

mod template;

pub use template::PromptTemplate;
