//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// "markdown", "json" or "both"
    pub format: Option<String>,
    /// Directory the report files are written to
    pub directory: Option<String>,
    /// Optional JSONL run log path
    pub run_log: Option<String>,
}
