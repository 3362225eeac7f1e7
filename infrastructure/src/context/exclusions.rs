//! Which paths never make it into the project context.

use glob::Pattern;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".next",
    ".git",
    "venv",
    "__pycache__",
    "_pycache_",
    "dist",
    "build",
    "target",
    ".idea",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    "env",
    ".env",
    ".venv",
    "site-packages",
    ".cursor",
];

const EXCLUDED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    ".DS_Store",
    ".env",
    ".env.local",
    ".gitignore",
    "README.md",
    "LICENSE",
    ".eslintrc",
    ".prettierrc",
    "tsconfig.json",
    "requirements.txt",
    "poetry.lock",
    "Pipfile.lock",
    ".gitattributes",
    ".gitconfig",
    ".gitmodules",
    ".cursorrules",
    ".cursorignore",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "ico", "svg", "mp4", "mp3", "pdf", "zip", "woff", "woff2", "ttf",
    "eot", "pyc", "pyo", "pyd", "so", "pkl", "pickle", "db", "sqlite", "log", "cache",
];

/// Directory names, file names, extensions and extra glob patterns to skip.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    dirs: BTreeSet<String>,
    files: BTreeSet<String>,
    extensions: BTreeSet<String>,
    patterns: Vec<Pattern>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            dirs: EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            files: EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            extensions: EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
        }
    }
}

impl ExclusionPolicy {
    /// Add glob patterns matched against the root-relative path and the
    /// file name. Invalid patterns are logged and skipped.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in patterns {
            match Pattern::new(raw.as_ref()) {
                Ok(p) => self.patterns.push(p),
                Err(e) => warn!(pattern = raw.as_ref(), error = %e, "Ignoring invalid exclude pattern"),
            }
        }
        self
    }

    pub fn excludes_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    pub fn excludes_file(&self, name: &str) -> bool {
        if self.files.contains(name) {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    /// Extra patterns against a root-relative path, `/`-separated.
    pub fn excludes_pattern(&self, relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        self.patterns
            .iter()
            .any(|p| p.matches(relative) || p.matches(name))
    }
}
