//! Context gathering limits from TOML (`[context]` section)

use crate::context::{ExclusionPolicy, LocalContextRetriever, RetrieverLimits};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContextConfig {
    pub max_files: usize,
    pub max_file_size_kb: u64,
    pub max_depth: usize,
    /// Extra glob patterns excluded on top of the built-in rules
    pub exclude: Vec<String>,
}

impl Default for FileContextConfig {
    fn default() -> Self {
        Self {
            max_files: 100,
            max_file_size_kb: 1000,
            max_depth: 10,
            exclude: Vec::new(),
        }
    }
}

impl FileContextConfig {
    pub fn to_retriever(&self) -> LocalContextRetriever {
        LocalContextRetriever::new(
            ExclusionPolicy::default().with_patterns(&self.exclude),
            RetrieverLimits {
                max_depth: self.max_depth,
                max_file_size: self.max_file_size_kb.saturating_mul(1024),
            },
        )
    }
}
