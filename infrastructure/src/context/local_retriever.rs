//! File system implementation of the `ContextRetriever` port.

use super::exclusions::ExclusionPolicy;
use architect_application::{ContextError, ContextRetriever};
use architect_domain::{PackageManagement, SourceFile, TextEncoding, WorkspaceSummary};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Walk and read limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrieverLimits {
    /// Directory levels below the root that are still walked.
    pub max_depth: usize,
    pub max_file_size: u64,
}

impl Default for RetrieverLimits {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_file_size: 1000 * 1024,
        }
    }
}

/// Reads project files from the local file system.
///
/// All blocking I/O runs on tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct LocalContextRetriever {
    policy: ExclusionPolicy,
    limits: RetrieverLimits,
}

impl LocalContextRetriever {
    pub fn new(policy: ExclusionPolicy, limits: RetrieverLimits) -> Self {
        Self { policy, limits }
    }

    fn walk(&self, root: &Path, dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
        if depth > self.limits.max_depth {
            return;
        }
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot read directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if self.policy.excludes_dir(&name) || self.policy.excludes_pattern(&relative_str) {
                    continue;
                }
                self.walk(root, &path, depth + 1, out);
            } else if file_type.is_file() {
                if self.policy.excludes_file(&name) || self.policy.excludes_pattern(&relative_str) {
                    continue;
                }
                out.push(relative.to_path_buf());
            }
        }
    }

    fn read_blocking(
        root: &Path,
        relative: &Path,
        limit: u64,
    ) -> Result<SourceFile, ContextError> {
        let full = root.join(relative);
        let io_err = |source| ContextError::Io {
            path: full.clone(),
            source,
        };

        let size = fs::metadata(&full).map_err(io_err)?.len();
        if size > limit {
            return Err(ContextError::TooLarge {
                path: relative.to_path_buf(),
                size,
                limit,
            });
        }
        let bytes = fs::read(&full).map_err(io_err)?;
        let (content, encoding) = decode(bytes);
        Ok(SourceFile::new(
            relative.to_string_lossy().replace('\\', "/"),
            content,
            encoding,
        ))
    }

    fn summarize_blocking(&self, root: &Path) -> Result<WorkspaceSummary, ContextError> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let entries = fs::read_dir(root).map_err(|source| ContextError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(t) if t.is_dir() && !self.policy.excludes_dir(&name) => dirs.push(name),
                Ok(t) if t.is_file() && !self.policy.excludes_file(&name) => files.push(name),
                _ => {}
            }
        }
        dirs.sort();
        files.sort();

        let exists = |name: &str| root.join(name).exists();
        Ok(WorkspaceSummary {
            workspace_name: root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            top_level_directories: dirs,
            top_level_files: files,
            package_management: PackageManagement {
                has_package_json: exists("package.json"),
                has_requirements_txt: exists("requirements.txt"),
                has_pipfile: exists("Pipfile"),
                has_poetry: exists("pyproject.toml"),
                has_cargo: exists("Cargo.toml"),
                has_docker: exists("Dockerfile") || exists("docker-compose.yml"),
            },
        })
    }
}

/// UTF-8 first, then Latin-1 for text-looking bytes, then lossy UTF-8.
fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(s) => (s, TextEncoding::Utf8),
        Err(e) => {
            let bytes = e.into_bytes();
            if bytes.contains(&0) {
                (String::from_utf8_lossy(&bytes).into_owned(), TextEncoding::Utf8Lossy)
            } else {
                (bytes.iter().map(|&b| b as char).collect(), TextEncoding::Latin1)
            }
        }
    }
}

fn ensure_root(root: &Path) -> Result<PathBuf, ContextError> {
    if root.is_dir() {
        Ok(root.to_path_buf())
    } else {
        Err(ContextError::RootNotFound(root.to_path_buf()))
    }
}

fn join_error(root: &Path, e: tokio::task::JoinError) -> ContextError {
    ContextError::Io {
        path: root.to_path_buf(),
        source: std::io::Error::other(e),
    }
}

#[async_trait]
impl ContextRetriever for LocalContextRetriever {
    async fn list_relevant_files(&self, root: &Path) -> Result<Vec<PathBuf>, ContextError> {
        let root = ensure_root(root)?;
        let this = self.clone();
        let walk_root = root.clone();
        let mut files = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            this.walk(&walk_root, &walk_root, 0, &mut out);
            out
        })
        .await
        .map_err(|e| join_error(&root, e))?;
        files.sort();
        debug!(root = %root.display(), count = files.len(), "Walked project");
        Ok(files)
    }

    async fn read_file(&self, root: &Path, path: &Path) -> Result<SourceFile, ContextError> {
        let root = root.to_path_buf();
        let relative = path.to_path_buf();
        let limit = self.limits.max_file_size;
        let join_root = root.clone();
        tokio::task::spawn_blocking(move || Self::read_blocking(&root, &relative, limit))
            .await
            .map_err(|e| join_error(&join_root, e))?
    }

    async fn workspace_summary(&self, root: &Path) -> Result<WorkspaceSummary, ContextError> {
        let root = ensure_root(root)?;
        let this = self.clone();
        let summary_root = root.clone();
        tokio::task::spawn_blocking(move || this.summarize_blocking(&summary_root))
            .await
            .map_err(|e| join_error(&root, e))?
    }
}
