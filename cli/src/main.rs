//! CLI entrypoint for codebase-architect
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use architect_application::{
    AnalysisOutput, AnalysisProgress, CompositeProgress, GatherContextInput, GatherContextUseCase,
    NoProgress, PhaseDataPolicy, RunAnalysisError, RunAnalysisInput, RunAnalysisUseCase,
};
use architect_infrastructure::{ConfigLoader, FileConfig, JsonlRunLogger, ProviderAgentFactory};
use architect_presentation::{
    Cli, ConsoleFormatter, OutputFormat, OutputFormatter, ProgressReporter, ReportFormatter,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const REPORT_STEM: &str = "project_analysis";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("{} configuration issue(s) found", issues.len());
    }

    let registry = config.to_registry()?;
    registry.ensure_complete()?;
    let mut policy = config.to_run_policy();
    if cli.strict {
        policy = policy.with_phase_data(PhaseDataPolicy::Strict);
    }
    let format = cli
        .format
        .or_else(|| {
            config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::parse_config)
        })
        .unwrap_or(OutputFormat::Markdown);
    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| config.output.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| cli.path.clone());

    info!(path = %cli.path.display(), "Starting codebase-architect");

    // === Cancellation ===
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl-C received, cancelling run");
                cancel.cancel();
            }
        });
    }

    // === Dependency Injection ===
    let retriever = Arc::new(config.context.to_retriever());
    let project = GatherContextUseCase::new(retriever)
        .with_cancellation(cancel.clone())
        .execute(GatherContextInput::new(&cli.path).with_max_files(config.context.max_files))
        .await
        .with_context(|| format!("Failed to read project at {}", cli.path.display()))?;

    let factory = Arc::new(ProviderAgentFactory::new(
        Arc::new(registry),
        config.to_providers_config(),
    )?);
    let use_case = RunAnalysisUseCase::new(factory, policy).with_cancellation(cancel);

    let reporter: Box<dyn AnalysisProgress> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };
    let run_log = run_log_path(&cli, &config).and_then(JsonlRunLogger::new);
    let mut notifiers: Vec<&dyn AnalysisProgress> = vec![reporter.as_ref()];
    if let Some(logger) = &run_log {
        notifiers.push(logger);
    }
    let progress = CompositeProgress::new(notifiers);

    let output = match use_case
        .execute_with_progress(RunAnalysisInput::new(project), &progress)
        .await
    {
        Ok(output) => output,
        Err(e) => {
            write_partial_report(&e, &output_dir);
            return Err(e.into());
        }
    };

    let written = write_reports(&output, format, &output_dir)?;
    if !cli.quiet {
        println!();
        println!("{}", ConsoleFormatter::format(&output));
        print!("{}", ConsoleFormatter::format_written(&written));
    }

    Ok(())
}

/// Stderr logging at the `-v` level, plus a daily-rolling file under `log_dir`.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "codebase-architect.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

fn run_log_path(cli: &Cli, config: &FileConfig) -> Option<PathBuf> {
    cli.run_log
        .clone()
        .or_else(|| config.output.run_log.as_ref().map(PathBuf::from))
}

fn write_reports(
    output: &AnalysisOutput,
    format: OutputFormat,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let formatter = ReportFormatter;
    let mut written = Vec::new();
    if format.writes_markdown() {
        let path = dir.join(format!("{}.md", REPORT_STEM));
        std::fs::write(&path, formatter.format_markdown(output))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    if format.writes_json() {
        let path = dir.join(format!("{}.json", REPORT_STEM));
        std::fs::write(&path, formatter.format_json(output)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Keep whatever completed before a failed or cancelled run.
fn write_partial_report(err: &RunAnalysisError, dir: &Path) {
    let Some(report) = err.partial_report() else {
        return;
    };
    if report.phases.is_empty() {
        return;
    }
    let path = dir.join(format!("{}.partial.json", REPORT_STEM));
    let result = serde_json::to_string_pretty(report)
        .map_err(std::io::Error::other)
        .and_then(|json| {
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, json)
        });
    match result {
        Ok(()) => eprintln!("Partial report written to {}", path.display()),
        Err(e) => warn!(path = %path.display(), error = %e, "Could not write partial report"),
    }
}
