//! Console output for finished runs

use architect_application::AnalysisOutput;
use architect_domain::{PhaseId, PhaseStatus};
use colored::Colorize;
use std::path::PathBuf;

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Per-phase status, the final analysis and totals
    pub fn format(output: &AnalysisOutput) -> String {
        let report = &output.report;
        let mut out = String::new();

        out.push_str(&Self::header(&format!(
            "Project Analysis: {}",
            report.project_name
        )));
        out.push('\n');

        for (phase, record) in &report.phases {
            let mark = match &record.status {
                PhaseStatus::Completed => "v".green(),
                PhaseStatus::Degraded { .. } => "!".yellow(),
            };
            out.push_str(&format!(
                "  {} {:<22} {} {}\n",
                mark,
                phase.display_name(),
                format!("{} / {}", record.provider, record.model).dimmed(),
                format!("({} tokens)", record.tokens_used()).dimmed(),
            ));
        }

        out.push_str(&Self::section_header(PhaseId::Final.display_name()));
        out.push('\n');
        out.push_str(output.final_analysis.output.trim_end());
        out.push_str("\n\n");

        out.push_str(&format!(
            "{} {}\n",
            "Total tokens:".cyan().bold(),
            output.final_analysis.tokens_used
        ));
        if !output.final_analysis.degraded_phases.is_empty() {
            let degraded: Vec<&str> = output
                .final_analysis
                .degraded_phases
                .iter()
                .map(PhaseId::as_str)
                .collect();
            out.push_str(&format!(
                "{} {}\n",
                "Degraded phases:".yellow().bold(),
                degraded.join(", ")
            ));
        }
        out
    }

    /// Lines announcing the report files that were written
    pub fn format_written(paths: &[PathBuf]) -> String {
        paths
            .iter()
            .map(|p| format!("{} {}\n", "Wrote".green().bold(), p.display()))
            .collect()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).cyan().bold())
    }
}
