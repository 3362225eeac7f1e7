//! Phase identifiers and the pipeline state machine.

use crate::core::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// One discrete stage of the analysis pipeline.
///
/// The variant order is the execution order; `Ord` follows it, so a
/// `BTreeMap<PhaseId, _>` iterates phases in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    /// Initial discovery: structure, dependencies, tech stack
    Phase1,
    /// Methodical planning of the deep analysis
    Phase2,
    /// Deep analysis following the plan
    Phase3,
    /// Synthesis of the deep analysis findings
    Phase4,
    /// Consolidation of all findings into one report
    Phase5,
    /// Final analysis producing the terminal artifact
    Final,
}

impl PhaseId {
    /// All phases in execution order.
    pub const ALL: [PhaseId; 6] = [
        PhaseId::Phase1,
        PhaseId::Phase2,
        PhaseId::Phase3,
        PhaseId::Phase4,
        PhaseId::Phase5,
        PhaseId::Final,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::Phase1 => "phase1",
            PhaseId::Phase2 => "phase2",
            PhaseId::Phase3 => "phase3",
            PhaseId::Phase4 => "phase4",
            PhaseId::Phase5 => "phase5",
            PhaseId::Final => "final",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseId::Phase1 => "Initial Discovery",
            PhaseId::Phase2 => "Methodical Planning",
            PhaseId::Phase3 => "Deep Analysis",
            PhaseId::Phase4 => "Synthesis",
            PhaseId::Phase5 => "Consolidation",
            PhaseId::Final => "Final Analysis",
        }
    }

    /// The key under which this phase's agent operation returns its text.
    pub fn result_key(&self) -> &'static str {
        match self {
            PhaseId::Phase1 | PhaseId::Phase3 => "analysis",
            PhaseId::Phase2 => "plan",
            PhaseId::Phase4 => "synthesis",
            PhaseId::Phase5 => "consolidated_report",
            PhaseId::Final => "final_analysis",
        }
    }

    /// The phase that runs after this one, `None` after [`PhaseId::Final`].
    pub fn next(&self) -> Option<PhaseId> {
        match self {
            PhaseId::Phase1 => Some(PhaseId::Phase2),
            PhaseId::Phase2 => Some(PhaseId::Phase3),
            PhaseId::Phase3 => Some(PhaseId::Phase4),
            PhaseId::Phase4 => Some(PhaseId::Phase5),
            PhaseId::Phase5 => Some(PhaseId::Final),
            PhaseId::Final => None,
        }
    }

    /// 1-based position in the pipeline.
    pub fn ordinal(&self) -> usize {
        *self as usize + 1
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PhaseId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phase1" => Ok(PhaseId::Phase1),
            "phase2" => Ok(PhaseId::Phase2),
            "phase3" => Ok(PhaseId::Phase3),
            "phase4" => Ok(PhaseId::Phase4),
            "phase5" => Ok(PhaseId::Phase5),
            "final" => Ok(PhaseId::Final),
            _ => Err(ConfigurationError::UnknownPhase(s.to_string())),
        }
    }
}

/// State of one orchestrator run.
///
/// ```text
/// Start → Running(phase1) → … → Running(final) → Done
///              └──────────────┴──→ Failed(phase) | Cancelled(phase)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "phase", rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Running(PhaseId),
    Done,
    Failed(PhaseId),
    Cancelled(PhaseId),
}

impl PipelineState {
    /// Advance after the current phase merged successfully.
    ///
    /// Terminal states stay where they are.
    pub fn advance(self) -> PipelineState {
        match self {
            PipelineState::Start => PipelineState::Running(PhaseId::Phase1),
            PipelineState::Running(phase) => match phase.next() {
                Some(next) => PipelineState::Running(next),
                None => PipelineState::Done,
            },
            terminal => terminal,
        }
    }

    /// Move into the absorbing error state.
    pub fn fail(self) -> PipelineState {
        match self {
            PipelineState::Running(phase) => PipelineState::Failed(phase),
            PipelineState::Start => PipelineState::Failed(PhaseId::Phase1),
            terminal => terminal,
        }
    }

    pub fn cancel(self) -> PipelineState {
        match self {
            PipelineState::Running(phase) => PipelineState::Cancelled(phase),
            PipelineState::Start => PipelineState::Cancelled(PhaseId::Phase1),
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::Failed(_) | PipelineState::Cancelled(_)
        )
    }
}
