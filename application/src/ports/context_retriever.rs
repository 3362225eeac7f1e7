//! Context retriever port
//!
//! Supplies filtered file listings, decoded file contents and workspace
//! metadata. All operations are reads.

use architect_domain::{SourceFile, WorkspaceSummary};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Project root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Files under `root` that pass the exclusion policy, relative to `root`,
    /// in a stable order.
    async fn list_relevant_files(&self, root: &Path) -> Result<Vec<PathBuf>, ContextError>;

    /// Decode one file (path relative to `root`) with the encoding fallback
    /// chain. Oversized files fail with [`ContextError::TooLarge`].
    async fn read_file(&self, root: &Path, path: &Path) -> Result<SourceFile, ContextError>;

    /// Top-level entries and package-management markers of `root`.
    async fn workspace_summary(&self, root: &Path) -> Result<WorkspaceSummary, ContextError>;
}
