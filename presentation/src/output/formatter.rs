//! Report formatting

use architect_application::AnalysisOutput;
use architect_domain::{PhaseId, PhaseRecord, PhaseStatus};

/// Trait for rendering a finished analysis run
pub trait OutputFormatter {
    /// Full report as markdown
    fn format_markdown(&self, output: &AnalysisOutput) -> String;

    /// Report, final analysis and run state as pretty JSON
    fn format_json(&self, output: &AnalysisOutput) -> Result<String, serde_json::Error>;
}

/// Plain markdown/JSON renderer for report files
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportFormatter;

impl ReportFormatter {
    fn phase_heading(phase: PhaseId) -> String {
        match phase {
            PhaseId::Final => phase.display_name().to_string(),
            _ => format!("Phase {}: {}", phase.ordinal(), phase.display_name()),
        }
    }

    fn record_section(record: &PhaseRecord) -> String {
        let mut out = format!("### {}\n\n", Self::phase_heading(record.phase));
        out.push_str(&format!(
            "_{} · {} · {} tokens · {} attempt(s)_\n\n",
            record.provider,
            record.model,
            record.tokens_used(),
            record.attempts
        ));
        if let PhaseStatus::Degraded { reason } = &record.status {
            out.push_str(&format!("> Degraded: {}\n\n", reason));
        }
        out.push_str(record.output.trim_end());
        out.push_str("\n\n");
        out
    }
}

impl OutputFormatter for ReportFormatter {
    fn format_markdown(&self, output: &AnalysisOutput) -> String {
        let report = &output.report;
        let mut md = format!("# Project Analysis: {}\n\n", report.project_name);
        md.push_str(&format!("_Analysis date: {}_\n\n", report.analysis_date));

        md.push_str("## Final Analysis\n\n");
        md.push_str(output.final_analysis.output.trim_end());
        md.push_str("\n\n");

        md.push_str("## Phase Reports\n\n");
        for (phase, record) in &report.phases {
            if *phase != PhaseId::Final {
                md.push_str(&Self::record_section(record));
            }
        }

        md.push_str("## Project Structure\n\n```text\n");
        md.push_str(report.project_structure.to_text().trim_end());
        md.push_str("\n```\n\n");

        if !report.excluded_files.is_empty() {
            md.push_str("## Excluded Files\n\n");
            for file in &report.excluded_files {
                md.push_str(&format!("- `{}`\n", file));
            }
            md.push('\n');
        }

        md.push_str(&format!(
            "---\nTotal tokens: {}",
            output.final_analysis.tokens_used
        ));
        if !output.final_analysis.degraded_phases.is_empty() {
            let degraded: Vec<&str> = output
                .final_analysis
                .degraded_phases
                .iter()
                .map(PhaseId::as_str)
                .collect();
            md.push_str(&format!(" · degraded phases: {}", degraded.join(", ")));
        }
        md.push('\n');
        md
    }

    fn format_json(&self, output: &AnalysisOutput) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&serde_json::json!({
            "report": output.report,
            "final_analysis": output.final_analysis,
            "state": output.state,
        }))
    }
}
