//! Pipeline phases, their raw results and the consolidated report.

pub mod id;
pub mod input;
pub mod report;
pub mod result;
pub mod sections;

pub use id::{PhaseId, PipelineState};
pub use input::PhaseInput;
pub use report::{
    ConsolidatedReport, FinalAnalysis, PhaseRecord, PhaseStatus, ReportError,
    UNAVAILABLE_PLACEHOLDER,
};
pub use result::{PhaseResult, TokenUsage};
pub use sections::split_sections;
