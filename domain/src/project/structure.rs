//! Project file tree as handed to the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry used when no structure was supplied.
pub const NO_STRUCTURE_SENTINEL: &str = "No project structure provided";

/// The target codebase's file tree.
///
/// Either pre-rendered tree lines or a mapping path → descriptor. The
/// pipeline treats it as opaque text apart from the emptiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectStructure {
    Tree(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl Default for ProjectStructure {
    fn default() -> Self {
        ProjectStructure::Tree(Vec::new())
    }
}

impl ProjectStructure {
    /// Single-entry placeholder used instead of an empty structure.
    pub fn sentinel() -> Self {
        ProjectStructure::Tree(vec![NO_STRUCTURE_SENTINEL.to_string()])
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, ProjectStructure::Tree(lines) if lines.len() == 1 && lines[0] == NO_STRUCTURE_SENTINEL)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ProjectStructure::Tree(lines) => lines.iter().all(|l| l.trim().is_empty()),
            ProjectStructure::Map(entries) => entries.is_empty(),
        }
    }

    /// `self`, or the sentinel when empty.
    pub fn or_sentinel(self) -> Self {
        if self.is_empty() {
            Self::sentinel()
        } else {
            self
        }
    }

    /// Render `/`-separated relative paths as an indented tree:
    ///
    /// ```text
    /// .
    /// ├── main.py
    /// └── core/
    ///     └── models.py
    /// ```
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = TreeNode::default();
        let mut any = false;
        for path in paths {
            let parts: Vec<&str> = path
                .as_ref()
                .split('/')
                .filter(|p| !p.is_empty() && *p != ".")
                .collect();
            if parts.is_empty() {
                continue;
            }
            any = true;
            root.insert(&parts);
        }
        if !any {
            return ProjectStructure::default();
        }

        let mut lines = vec![".".to_string()];
        root.render("", &mut lines);
        ProjectStructure::Tree(lines)
    }

    /// Plain-text form used inside prompts.
    pub fn to_text(&self) -> String {
        match self {
            ProjectStructure::Tree(lines) => lines.join("\n"),
            ProjectStructure::Map(entries) => entries
                .iter()
                .map(|(path, desc)| {
                    if desc.is_empty() {
                        path.clone()
                    } else {
                        format!("{}: {}", path, desc)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Default)]
struct TreeNode {
    dirs: BTreeMap<String, TreeNode>,
    files: Vec<String>,
}

impl TreeNode {
    fn insert(&mut self, parts: &[&str]) {
        match parts {
            [] => {}
            [file] => {
                if !self.files.iter().any(|f| f == file) {
                    self.files.push(file.to_string());
                }
            }
            [dir, rest @ ..] => self
                .dirs
                .entry(dir.to_string())
                .or_default()
                .insert(rest),
        }
    }

    fn render(&self, prefix: &str, lines: &mut Vec<String>) {
        let mut files = self.files.clone();
        files.sort();
        let total = files.len() + self.dirs.len();
        let mut index = 0;

        for file in files {
            index += 1;
            let branch = if index == total { "└── " } else { "├── " };
            lines.push(format!("{}{}{}", prefix, branch, file));
        }
        for (name, child) in &self.dirs {
            index += 1;
            let last = index == total;
            let branch = if last { "└── " } else { "├── " };
            lines.push(format!("{}{}{}/", prefix, branch, name));
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            child.render(&child_prefix, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tree() {
        let structure = ProjectStructure::from_paths([
            "main.py",
            "config/settings.py",
            "config/__init__.py",
            "tests/test_main.py",
        ]);
        let expected = vec![
            ".",
            "├── main.py",
            "├── config/",
            "│   ├── __init__.py",
            "│   └── settings.py",
            "└── tests/",
            "    └── test_main.py",
        ];
        assert_eq!(
            structure,
            ProjectStructure::Tree(expected.into_iter().map(String::from).collect())
        );
    }

    #[test]
    fn test_empty_paths_give_empty_structure() {
        let structure = ProjectStructure::from_paths(Vec::<String>::new());
        assert!(structure.is_empty());
        assert!(structure.or_sentinel().is_sentinel());
    }

    #[test]
    fn test_blank_lines_count_as_empty() {
        assert!(ProjectStructure::Tree(vec!["  ".into(), String::new()]).is_empty());
        assert!(ProjectStructure::Map(BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_non_empty_structure_kept() {
        let structure = ProjectStructure::Tree(vec![".".into(), "└── a.rs".into()]);
        assert_eq!(structure.clone().or_sentinel(), structure);
    }

    #[test]
    fn test_map_text() {
        let mut map = BTreeMap::new();
        map.insert("src/lib.rs".to_string(), "library root".to_string());
        map.insert("README".to_string(), String::new());
        let text = ProjectStructure::Map(map).to_text();
        assert_eq!(text, "README\nsrc/lib.rs: library root");
    }
}
