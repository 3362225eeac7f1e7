//! Progress reporting for analysis runs

use architect_application::{AgentError, AnalysisProgress};
use architect_domain::{PhaseId, PhaseRecord, PhaseStatus, ProviderKind};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

fn phase_label(phase: PhaseId) -> String {
    match phase {
        PhaseId::Final => phase.display_name().to_string(),
        _ => format!("Phase {}: {}", phase.ordinal(), phase.display_name()),
    }
}

/// Reports progress with an indicatif bar, one tick per phase
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisProgress for ProgressReporter {
    fn on_run_start(&self, project: &str, phases: &[PhaseId]) {
        let bar = ProgressBar::new(phases.len() as u64);
        bar.set_style(Self::phase_style());
        bar.set_prefix(project.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_phase_start(&self, phase: PhaseId, provider: ProviderKind, model: &str, attempt: u32) {
        let mut msg = format!("{} via {} / {}", phase_label(phase), provider, model);
        if attempt > 1 {
            msg.push_str(&format!(" (attempt {})", attempt));
        }
        self.with_bar(|bar| bar.set_message(msg));
    }

    fn on_phase_retry(&self, phase: PhaseId, attempt: u32, error: &AgentError, delay: Duration) {
        let line = format!(
            "  {} {} attempt {} failed: {} (retrying in {:.1}s)",
            "!".yellow(),
            phase_label(phase),
            attempt,
            error,
            delay.as_secs_f64()
        );
        self.with_bar(|bar| bar.println(line));
    }

    fn on_phase_complete(&self, phase: PhaseId, record: &PhaseRecord) {
        let line = match &record.status {
            PhaseStatus::Completed => format!("  {} {}", "v".green(), phase_label(phase)),
            PhaseStatus::Degraded { reason } => format!(
                "  {} {} degraded: {}",
                "!".yellow(),
                phase_label(phase),
                reason
            ),
        };
        self.with_bar(|bar| {
            bar.println(line);
            bar.inc(1);
        });
    }

    fn on_phase_failed(&self, phase: PhaseId, error: &str) {
        if let Some(bar) = self.take_bar() {
            bar.abandon_with_message(format!("{} {}: {}", "x".red(), phase_label(phase), error));
        }
    }

    fn on_cancelled(&self, phase: PhaseId) {
        if let Some(bar) = self.take_bar() {
            bar.abandon_with_message(format!("{} before {}", "Cancelled".yellow(), phase_label(phase)));
        }
    }

    fn on_run_complete(&self, tokens_used: u64, _degraded: &[PhaseId]) {
        if let Some(bar) = self.take_bar() {
            bar.finish_with_message(format!("{} ({} tokens)", "complete!".green(), tokens_used));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl AnalysisProgress for SimpleProgress {
    fn on_phase_start(&self, phase: PhaseId, provider: ProviderKind, model: &str, attempt: u32) {
        if attempt == 1 {
            println!(
                "{} {} ({} / {})",
                "->".cyan(),
                phase_label(phase).bold(),
                provider,
                model
            );
        }
    }

    fn on_phase_retry(&self, _phase: PhaseId, attempt: u32, error: &AgentError, delay: Duration) {
        println!(
            "  {} attempt {} failed: {} (retrying in {:.1}s)",
            "!".yellow(),
            attempt,
            error,
            delay.as_secs_f64()
        );
    }

    fn on_phase_complete(&self, _phase: PhaseId, record: &PhaseRecord) {
        match &record.status {
            PhaseStatus::Completed => println!("  {} {} tokens", "v".green(), record.tokens_used()),
            PhaseStatus::Degraded { reason } => println!("  {} degraded: {}", "!".yellow(), reason),
        }
    }

    fn on_phase_failed(&self, _phase: PhaseId, error: &str) {
        println!("  {} {}", "x".red(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(phase_label(PhaseId::Phase3), "Phase 3: Deep Analysis");
        assert_eq!(phase_label(PhaseId::Final), "Final Analysis");
    }

    #[test]
    fn test_reporter_lifecycle_without_terminal() {
        let reporter = ProgressReporter::new();
        reporter.on_run_start("demo", &PhaseId::ALL);
        reporter.on_phase_start(PhaseId::Phase1, ProviderKind::AzureOpenAi, "gpt-4o", 1);
        let record = PhaseRecord::completed(
            PhaseId::Phase1,
            ProviderKind::AzureOpenAi,
            "gpt-4o",
            "ok",
        );
        reporter.on_phase_complete(PhaseId::Phase1, &record);
        reporter.with_bar(|bar| assert_eq!(bar.position(), 1));
        reporter.on_run_complete(0, &[]);
        assert!(reporter.take_bar().is_none());
    }
}
