//! Project input: file tree, file contents and workspace metadata.

pub mod entities;
pub mod structure;

pub use entities::{
    PackageManagement, ProjectContext, SourceFile, TextEncoding, WorkspaceSummary,
    detect_language,
};
pub use structure::{NO_STRUCTURE_SENTINEL, ProjectStructure};
