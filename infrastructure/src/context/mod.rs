//! Local file system context retrieval
//!
//! [`LocalContextRetriever`] implements the application's `ContextRetriever`
//! port: it walks a project directory under an [`ExclusionPolicy`], reads
//! source files with encoding fallback and summarizes the workspace root.

mod exclusions;
mod local_retriever;

pub use exclusions::ExclusionPolicy;
pub use local_retriever::{LocalContextRetriever, RetrieverLimits};
