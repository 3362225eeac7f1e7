//! Consolidated report built by the orchestrator, one record per phase.

use super::id::PhaseId;
use super::result::TokenUsage;
use super::sections::split_sections;
use crate::model::ProviderKind;
use crate::project::ProjectStructure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Text recorded for a phase whose output could not be used.
pub const UNAVAILABLE_PLACEHOLDER: &str = "[unavailable: phase output could not be parsed]";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("cannot merge {phase}: {last} is already recorded and phases merge in order")]
    OutOfOrder { phase: PhaseId, last: PhaseId },
}

/// Outcome of a recorded phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    /// Output was unusable; a placeholder was recorded instead.
    Degraded { reason: String },
}

/// One phase's contribution to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: PhaseId,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(flatten)]
    pub status: PhaseStatus,
    /// Raw text under the phase's result key.
    pub output: String,
    /// Level-2 markdown sections of `output` (e.g. phase1 structure/dependencies/tech stack).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub attempts: u32,
}

impl PhaseRecord {
    pub fn completed(
        phase: PhaseId,
        provider: ProviderKind,
        model: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        let output = output.into();
        Self {
            phase,
            provider,
            model: model.into(),
            status: PhaseStatus::Completed,
            sections: split_sections(&output),
            output,
            usage: None,
            attempts: 1,
        }
    }

    pub fn degraded(
        phase: PhaseId,
        provider: ProviderKind,
        model: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            provider,
            model: model.into(),
            status: PhaseStatus::Degraded {
                reason: reason.into(),
            },
            output: UNAVAILABLE_PLACEHOLDER.to_string(),
            sections: BTreeMap::new(),
            usage: None,
            attempts: 1,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, PhaseStatus::Degraded { .. })
    }

    pub fn tokens_used(&self) -> u64 {
        self.usage.map(|u| u.total()).unwrap_or(0)
    }
}

/// Aggregate of all phase records of one run, keyed by phase in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub project_name: String,
    pub analysis_date: String,
    pub project_structure: ProjectStructure,
    #[serde(default)]
    pub excluded_files: Vec<String>,
    pub phases: BTreeMap<PhaseId, PhaseRecord>,
}

impl ConsolidatedReport {
    pub fn new(
        project_name: impl Into<String>,
        analysis_date: impl Into<String>,
        project_structure: ProjectStructure,
        excluded_files: Vec<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            analysis_date: analysis_date.into(),
            project_structure,
            excluded_files,
            phases: BTreeMap::new(),
        }
    }

    /// Merge a phase record. Phases must arrive in strictly increasing order.
    pub fn merge(&mut self, record: PhaseRecord) -> Result<(), ReportError> {
        if let Some(last) = self.last_phase()
            && last >= record.phase
        {
            return Err(ReportError::OutOfOrder {
                phase: record.phase,
                last,
            });
        }
        self.phases.insert(record.phase, record);
        Ok(())
    }

    pub fn get(&self, phase: PhaseId) -> Option<&PhaseRecord> {
        self.phases.get(&phase)
    }

    pub fn contains(&self, phase: PhaseId) -> bool {
        self.phases.contains_key(&phase)
    }

    pub fn last_phase(&self) -> Option<PhaseId> {
        self.phases.keys().next_back().copied()
    }

    /// Recorded phases in pipeline order.
    pub fn phase_ids(&self) -> Vec<PhaseId> {
        self.phases.keys().copied().collect()
    }

    /// Records of every phase strictly before `phase`.
    pub fn records_before(&self, phase: PhaseId) -> Vec<&PhaseRecord> {
        self.phases.range(..phase).map(|(_, r)| r).collect()
    }

    pub fn degraded_phases(&self) -> Vec<PhaseId> {
        self.phases
            .values()
            .filter(|r| r.is_degraded())
            .map(|r| r.phase)
            .collect()
    }

    pub fn total_usage(&self) -> TokenUsage {
        self.phases.values().filter_map(|r| r.usage).sum()
    }
}

/// Terminal artifact of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnalysis {
    /// Human/agent-readable final report.
    pub output: String,
    /// Aggregate token usage across every phase of the run, final included.
    pub tokens_used: u64,
    /// Phases recorded with a placeholder instead of real output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_phases: Vec<PhaseId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ConsolidatedReport {
        ConsolidatedReport::new(
            "Test Project",
            "2026-01-01",
            ProjectStructure::Tree(vec![".".to_string()]),
            vec![],
        )
    }

    fn record(phase: PhaseId, text: &str) -> PhaseRecord {
        PhaseRecord::completed(phase, ProviderKind::AzureOpenAi, "gpt-4o", text)
    }

    #[test]
    fn test_merge_in_order() {
        let mut report = report();
        report.merge(record(PhaseId::Phase1, "a")).unwrap();
        report.merge(record(PhaseId::Phase2, "b")).unwrap();
        assert_eq!(report.phase_ids(), vec![PhaseId::Phase1, PhaseId::Phase2]);
    }

    #[test]
    fn test_merge_out_of_order_rejected() {
        let mut report = report();
        report.merge(record(PhaseId::Phase3, "c")).unwrap();
        let err = report.merge(record(PhaseId::Phase2, "b")).unwrap_err();
        assert_eq!(
            err,
            ReportError::OutOfOrder {
                phase: PhaseId::Phase2,
                last: PhaseId::Phase3
            }
        );
        let dup = report.merge(record(PhaseId::Phase3, "again"));
        assert!(dup.is_err());
        assert_eq!(report.get(PhaseId::Phase3).unwrap().output, "c");
    }

    #[test]
    fn test_records_before_excludes_current_and_later() {
        let mut report = report();
        for phase in [PhaseId::Phase1, PhaseId::Phase2, PhaseId::Phase3] {
            report.merge(record(phase, phase.as_str())).unwrap();
        }
        let earlier: Vec<_> = report
            .records_before(PhaseId::Phase3)
            .iter()
            .map(|r| r.phase)
            .collect();
        assert_eq!(earlier, vec![PhaseId::Phase1, PhaseId::Phase2]);
    }

    #[test]
    fn test_completed_record_parses_sections() {
        let r = record(PhaseId::Phase1, "## Structure\nX\n## Tech Stack\nRust");
        assert_eq!(r.sections["structure"], "X");
        assert_eq!(r.sections["tech_stack"], "Rust");
    }

    #[test]
    fn test_degraded_tracking_and_usage() {
        let mut report = report();
        report
            .merge(record(PhaseId::Phase1, "a").with_usage(Some(TokenUsage::new(5, 5))))
            .unwrap();
        report
            .merge(PhaseRecord::degraded(
                PhaseId::Phase2,
                ProviderKind::AzureOpenAi,
                "gpt-4o",
                "missing key",
            ))
            .unwrap();
        assert_eq!(report.degraded_phases(), vec![PhaseId::Phase2]);
        assert_eq!(report.total_usage().total(), 10);
        assert_eq!(
            report.get(PhaseId::Phase2).unwrap().output,
            UNAVAILABLE_PLACEHOLDER
        );
    }

    #[test]
    fn test_report_serializes_phase_keys() {
        let mut report = report();
        report.merge(record(PhaseId::Phase1, "a")).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["phases"]["phase1"].is_object());
        assert_eq!(json["phases"]["phase1"]["status"], "completed");
    }
}
