//! Input handed to one phase call.

use super::id::PhaseId;
use super::report::{ConsolidatedReport, PhaseRecord};
use crate::project::{ProjectContext, ProjectStructure};
use std::sync::Arc;

/// Everything a phase may see: the immutable project context and the
/// records of strictly earlier phases.
#[derive(Debug, Clone)]
pub struct PhaseInput {
    pub phase: PhaseId,
    pub project: Arc<ProjectContext>,
    prior: Vec<PhaseRecord>,
}

impl PhaseInput {
    /// Build the input for `phase` from the report accumulated so far.
    ///
    /// Records at or after `phase` are never copied in.
    pub fn from_report(
        phase: PhaseId,
        project: Arc<ProjectContext>,
        report: &ConsolidatedReport,
    ) -> Self {
        let prior = report.records_before(phase).into_iter().cloned().collect();
        Self {
            phase,
            project,
            prior,
        }
    }

    pub fn new(phase: PhaseId, project: Arc<ProjectContext>, prior: Vec<PhaseRecord>) -> Self {
        let prior = prior.into_iter().filter(|r| r.phase < phase).collect();
        Self {
            phase,
            project,
            prior,
        }
    }

    /// Earlier records in phase order.
    pub fn prior(&self) -> &[PhaseRecord] {
        &self.prior
    }

    pub fn prior_output(&self, phase: PhaseId) -> Option<&str> {
        self.prior
            .iter()
            .find(|r| r.phase == phase)
            .map(|r| r.output.as_str())
    }

    /// Project structure, with the sentinel substituted when empty.
    pub fn structure(&self) -> ProjectStructure {
        self.project.structure.clone().or_sentinel()
    }

    pub fn excluded_files(&self) -> &[String] {
        &self.project.excluded_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderKind;

    fn record(phase: PhaseId, output: &str) -> PhaseRecord {
        PhaseRecord::completed(phase, ProviderKind::OpenAi, "gpt-4.1", output)
    }

    #[test]
    fn test_from_report_only_sees_earlier_phases() {
        let mut report =
            ConsolidatedReport::new("demo", "2026-01-01", ProjectStructure::default(), vec![]);
        report.merge(record(PhaseId::Phase1, "one")).unwrap();
        report.merge(record(PhaseId::Phase2, "two")).unwrap();
        report.merge(record(PhaseId::Phase3, "three")).unwrap();

        let input = PhaseInput::from_report(
            PhaseId::Phase3,
            Arc::new(ProjectContext::default()),
            &report,
        );
        let phases: Vec<_> = input.prior().iter().map(|r| r.phase).collect();
        assert_eq!(phases, vec![PhaseId::Phase1, PhaseId::Phase2]);
        assert_eq!(input.prior_output(PhaseId::Phase2), Some("two"));
        assert_eq!(input.prior_output(PhaseId::Phase3), None);
    }

    #[test]
    fn test_new_drops_later_records() {
        let input = PhaseInput::new(
            PhaseId::Phase2,
            Arc::new(ProjectContext::default()),
            vec![record(PhaseId::Phase1, "one"), record(PhaseId::Phase4, "four")],
        );
        assert_eq!(input.prior().len(), 1);
    }

    #[test]
    fn test_empty_structure_becomes_sentinel() {
        let input = PhaseInput::new(PhaseId::Phase1, Arc::new(ProjectContext::default()), vec![]);
        assert!(input.structure().is_sentinel());
    }
}
