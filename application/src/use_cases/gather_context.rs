//! Gather Context use case.
//!
//! Builds the immutable [`ProjectContext`] a run starts from:
//!
//! 1. List the files that pass the exclusion policy
//! 2. Render the project tree from that listing
//! 3. Read up to `max_files` of them concurrently; oversized or unreadable
//!    files and files past the limit are recorded as excluded
//! 4. Attach the workspace summary

use crate::ports::context_retriever::{ContextError, ContextRetriever};
use crate::use_cases::shared::is_cancelled;
use architect_domain::{ProjectContext, ProjectStructure, SourceFile};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Number of files read at the same time.
const READ_CONCURRENCY: usize = 8;

/// Input for the GatherContext use case
#[derive(Debug, Clone)]
pub struct GatherContextInput {
    pub root: PathBuf,
    /// Project name; defaults to the root directory's name.
    pub name: Option<String>,
    pub max_files: usize,
}

impl GatherContextInput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: None,
            max_files: 100,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    fn project_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.root
                .canonicalize()
                .ok()
                .as_deref()
                .unwrap_or(self.root.as_path())
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        })
    }
}

/// Use case for gathering project context
pub struct GatherContextUseCase<C: ContextRetriever> {
    retriever: Arc<C>,
    cancellation_token: Option<CancellationToken>,
}

impl<C: ContextRetriever + 'static> GatherContextUseCase<C> {
    pub fn new(retriever: Arc<C>) -> Self {
        Self {
            retriever,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(&self, input: GatherContextInput) -> Result<ProjectContext, ContextError> {
        let root = input.root.as_path();
        let paths = self.retriever.list_relevant_files(root).await?;
        info!(root = %root.display(), files = paths.len(), "Listed relevant files");

        let structure = ProjectStructure::from_paths(paths.iter().map(|p| display_path(p)));

        let (selected, overflow) = paths.split_at(paths.len().min(input.max_files));
        let mut excluded: Vec<String> = overflow.iter().map(|p| display_path(p)).collect();
        if !overflow.is_empty() {
            warn!(
                limit = input.max_files,
                skipped = overflow.len(),
                "File limit reached, remaining files excluded"
            );
        }

        let (files, unreadable) = if is_cancelled(&self.cancellation_token) {
            (Vec::new(), Vec::new())
        } else {
            self.read_files(root, selected).await
        };
        excluded.extend(unreadable);

        let workspace = self.retriever.workspace_summary(root).await?;

        let mut context = ProjectContext::new(input.project_name(), structure)
            .with_files(files)
            .with_excluded_files(excluded)
            .with_workspace(workspace);
        context.excluded_files.sort();

        info!(
            project = %context.name,
            included = context.files.len(),
            excluded = context.excluded_files.len(),
            "Gathered project context"
        );
        Ok(context)
    }

    /// Read `paths` concurrently, preserving their order.
    async fn read_files(&self, root: &Path, paths: &[PathBuf]) -> (Vec<SourceFile>, Vec<String>) {
        let results: Vec<(String, Result<SourceFile, ContextError>)> = stream::iter(paths)
            .map(|path| {
                let retriever = Arc::clone(&self.retriever);
                async move {
                    let result = retriever.read_file(root, path).await;
                    (display_path(path), result)
                }
            })
            .buffered(READ_CONCURRENCY)
            .collect()
            .await;

        let mut files = Vec::new();
        let mut excluded = Vec::new();
        for (path, result) in results {
            match result {
                Ok(file) => files.push(file),
                Err(e) => {
                    debug!(path = %path, error = %e, "Excluding file");
                    excluded.push(path);
                }
            }
        }
        (files, excluded)
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
