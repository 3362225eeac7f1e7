//! Project context gathered before a run.

use super::structure::ProjectStructure;
use serde::{Deserialize, Serialize};

/// Map a file extension to a language tag used in `<file>` blocks.
pub fn detect_language(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "c" => "c",
        "cpp" => "cpp",
        "java" => "java",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "sh" => "shell",
        "yml" | "yaml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "sql" => "sql",
        "swift" => "swift",
        "kt" => "kotlin",
        "dart" => "dart",
        "vue" => "vue",
        "scss" => "scss",
        "less" => "less",
        "tf" => "terraform",
        "ps1" => "powershell",
        _ => "text",
    }
}

/// Encoding a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    /// Invalid UTF-8 sequences replaced with U+FFFD.
    Utf8Lossy,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf8Lossy => "utf-8 (with replacement)",
        }
    }
}

/// A file whose contents are part of the analysis input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub content: String,
    pub encoding: TextEncoding,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding,
        }
    }

    pub fn language(&self) -> &'static str {
        detect_language(&self.path)
    }

    /// `<file path=".." language="..">` block used in prompts.
    pub fn formatted(&self) -> String {
        format!(
            "<file path=\"{}\" language=\"{}\">\n{}\n</file>",
            self.path,
            self.language(),
            self.content
        )
    }
}

/// Package-management markers found at the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagement {
    pub has_package_json: bool,
    pub has_requirements_txt: bool,
    pub has_pipfile: bool,
    pub has_poetry: bool,
    pub has_cargo: bool,
    pub has_docker: bool,
}

/// Workspace metadata: top-level entries and package-management markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub workspace_name: String,
    pub top_level_directories: Vec<String>,
    pub top_level_files: Vec<String>,
    pub package_management: PackageManagement,
}

/// Immutable project input of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub name: String,
    pub structure: ProjectStructure,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Files left out of the analysis (size, file limit, unreadable).
    #[serde(default)]
    pub excluded_files: Vec<String>,
    #[serde(default)]
    pub workspace: Option<WorkspaceSummary>,
}

impl ProjectContext {
    pub fn new(name: impl Into<String>, structure: ProjectStructure) -> Self {
        Self {
            name: name.into(),
            structure,
            ..Default::default()
        }
    }

    pub fn with_files(mut self, files: Vec<SourceFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_excluded_files(mut self, excluded: Vec<String>) -> Self {
        self.excluded_files = excluded;
        self
    }

    pub fn with_workspace(mut self, workspace: WorkspaceSummary) -> Self {
        self.workspace = Some(workspace);
        self
    }

    /// All file blocks joined for inclusion in a prompt.
    pub fn formatted_files(&self) -> String {
        self.files
            .iter()
            .map(SourceFile::formatted)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("src/main.rs"), "rust");
        assert_eq!(detect_language("a/b/STYLE.SCSS"), "scss");
        assert_eq!(detect_language("Makefile"), "text");
    }

    #[test]
    fn test_formatted_file_block() {
        let file = SourceFile::new("core/models.py", "class A: pass", TextEncoding::Utf8);
        assert_eq!(
            file.formatted(),
            "<file path=\"core/models.py\" language=\"python\">\nclass A: pass\n</file>"
        );
    }

    #[test]
    fn test_context_builders() {
        let ctx = ProjectContext::new("demo", ProjectStructure::default())
            .with_files(vec![
                SourceFile::new("a.rs", "fn a() {}", TextEncoding::Utf8),
                SourceFile::new("b.rs", "fn b() {}", TextEncoding::Utf8),
            ])
            .with_excluded_files(vec!["big.bin".into()]);
        assert_eq!(ctx.formatted_files().matches("<file ").count(), 2);
        assert_eq!(ctx.excluded_files, vec!["big.bin".to_string()]);
        assert!(ctx.workspace.is_none());
    }
}
