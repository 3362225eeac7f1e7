//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `project_analysis.md`
    #[value(alias = "md")]
    Markdown,
    /// `project_analysis.json`
    Json,
    /// Both files
    Both,
}

impl OutputFormat {
    pub fn writes_markdown(&self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn writes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    /// Parse a config-file value (`markdown`, `md`, `json`, `both`).
    pub fn parse_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// CLI arguments for codebase-architect
#[derive(Parser, Debug)]
#[command(name = "codebase-architect")]
#[command(author, version, about = "Multi-phase LLM analysis of a codebase")]
#[command(long_about = r#"
Codebase Architect walks a project through six analysis phases, each bound
to its own model:

1. Initial Discovery     project structure, dependencies, tech stack
2. Methodical Planning   what to examine and how
3. Deep Analysis         file-level findings
4. Synthesis             cross-cutting patterns and risks
5. Consolidation         one coherent report
6. Final Analysis        architecture verdict and recommendations

Configuration files are loaded from (in priority order):
1. ARCHITECT_* environment variables (e.g. ARCHITECT_BEHAVIOR__MAX_ATTEMPTS=5)
2. --config <path>     Explicit config file
3. ./architect.toml    Project-level config
4. ~/.config/codebase-architect/config.toml   Global config

Example:
  codebase-architect .
  codebase-architect ../service --format both --output-dir reports
  codebase-architect . --strict -vv
"#)]
pub struct Cli {
    /// Project directory to analyze
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Directory the report files are written to (default: the project directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Fail the run when a phase returns unusable output
    #[arg(long)]
    pub strict: bool,

    /// Write phase events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub run_log: Option<PathBuf>,

    /// Write rolling debug logs to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
