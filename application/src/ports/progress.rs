//! Progress notification port
//!
//! Defines the interface for reporting progress during an analysis run.

use crate::ports::agent::AgentError;
use architect_domain::{PhaseId, PhaseRecord, ProviderKind};
use std::time::Duration;

/// Callback for progress updates during an analysis run
///
/// Implementations live in the presentation layer (console) or the
/// infrastructure layer (JSONL run log).
pub trait AnalysisProgress: Send + Sync {
    /// Called when the run starts, after every agent was resolved
    fn on_run_start(&self, _project: &str, _phases: &[PhaseId]) {}

    /// Called before each attempt of a phase call
    fn on_phase_start(&self, phase: PhaseId, provider: ProviderKind, model: &str, attempt: u32);

    /// Called when an attempt failed and will be retried after `delay`
    fn on_phase_retry(&self, _phase: PhaseId, _attempt: u32, _error: &AgentError, _delay: Duration) {}

    /// Called after a phase's record was merged into the report
    fn on_phase_complete(&self, phase: PhaseId, record: &PhaseRecord);

    /// Called when a phase fails for good
    fn on_phase_failed(&self, phase: PhaseId, error: &str);

    /// Called when the run is cancelled before or during `phase`
    fn on_cancelled(&self, _phase: PhaseId) {}

    /// Called once the final analysis is produced
    fn on_run_complete(&self, _tokens_used: u64, _degraded: &[PhaseId]) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl AnalysisProgress for NoProgress {
    fn on_phase_start(&self, _: PhaseId, _: ProviderKind, _: &str, _: u32) {}
    fn on_phase_complete(&self, _: PhaseId, _: &PhaseRecord) {}
    fn on_phase_failed(&self, _: PhaseId, _: &str) {}
}

/// Fans every event out to several notifiers
pub struct CompositeProgress<'a> {
    notifiers: Vec<&'a dyn AnalysisProgress>,
}

impl<'a> CompositeProgress<'a> {
    pub fn new(notifiers: Vec<&'a dyn AnalysisProgress>) -> Self {
        Self { notifiers }
    }
}

impl AnalysisProgress for CompositeProgress<'_> {
    fn on_run_start(&self, project: &str, phases: &[PhaseId]) {
        for n in &self.notifiers {
            n.on_run_start(project, phases);
        }
    }

    fn on_phase_start(&self, phase: PhaseId, provider: ProviderKind, model: &str, attempt: u32) {
        for n in &self.notifiers {
            n.on_phase_start(phase, provider, model, attempt);
        }
    }

    fn on_phase_retry(&self, phase: PhaseId, attempt: u32, error: &AgentError, delay: Duration) {
        for n in &self.notifiers {
            n.on_phase_retry(phase, attempt, error, delay);
        }
    }

    fn on_phase_complete(&self, phase: PhaseId, record: &PhaseRecord) {
        for n in &self.notifiers {
            n.on_phase_complete(phase, record);
        }
    }

    fn on_phase_failed(&self, phase: PhaseId, error: &str) {
        for n in &self.notifiers {
            n.on_phase_failed(phase, error);
        }
    }

    fn on_cancelled(&self, phase: PhaseId) {
        for n in &self.notifiers {
            n.on_cancelled(phase);
        }
    }

    fn on_run_complete(&self, tokens_used: u64, degraded: &[PhaseId]) {
        for n in &self.notifiers {
            n.on_run_complete(tokens_used, degraded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl AnalysisProgress for Recorder {
        fn on_phase_start(&self, phase: PhaseId, _: ProviderKind, _: &str, attempt: u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} #{}", phase, attempt));
        }
        fn on_phase_complete(&self, phase: PhaseId, _: &PhaseRecord) {
            self.events.lock().unwrap().push(format!("done {}", phase));
        }
        fn on_phase_failed(&self, phase: PhaseId, _: &str) {
            self.events.lock().unwrap().push(format!("fail {}", phase));
        }
    }

    #[test]
    fn test_composite_fans_out() {
        let a = Recorder::default();
        let b = Recorder::default();
        let composite = CompositeProgress::new(vec![&a, &b]);
        composite.on_phase_start(PhaseId::Phase1, ProviderKind::OpenAi, "m", 1);
        composite.on_phase_failed(PhaseId::Phase1, "boom");

        for recorder in [&a, &b] {
            assert_eq!(
                *recorder.events.lock().unwrap(),
                vec!["start phase1 #1".to_string(), "fail phase1".to_string()]
            );
        }
    }
}
