//! JSONL file writer for analysis run events.
//!
//! Every progress callback becomes one JSON line with an `event` field and
//! a `timestamp`, appended through a buffered writer.

use architect_application::{AgentError, AnalysisProgress};
use architect_domain::{PhaseId, PhaseRecord, PhaseStatus, ProviderKind};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Run logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlRunLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRunLogger {
    /// Create the log file (and parent directories).
    ///
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create run log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create run log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, event: &str, payload: Value) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut record = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("event".to_string(), Value::String(event.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&Value::Object(record)) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl AnalysisProgress for JsonlRunLogger {
    fn on_run_start(&self, project: &str, phases: &[PhaseId]) {
        self.write(
            "run_start",
            json!({
                "project": project,
                "phases": phases.iter().map(PhaseId::as_str).collect::<Vec<_>>(),
            }),
        );
    }

    fn on_phase_start(&self, phase: PhaseId, provider: ProviderKind, model: &str, attempt: u32) {
        self.write(
            "phase_start",
            json!({
                "phase": phase.as_str(),
                "provider": provider.as_str(),
                "model": model,
                "attempt": attempt,
            }),
        );
    }

    fn on_phase_retry(&self, phase: PhaseId, attempt: u32, error: &AgentError, delay: Duration) {
        self.write(
            "phase_retry",
            json!({
                "phase": phase.as_str(),
                "attempt": attempt,
                "error": error.to_string(),
                "delay_ms": delay.as_millis() as u64,
            }),
        );
    }

    fn on_phase_complete(&self, phase: PhaseId, record: &PhaseRecord) {
        let mut payload = json!({
            "phase": phase.as_str(),
            "provider": record.provider.as_str(),
            "model": record.model,
            "attempts": record.attempts,
            "tokens": record.tokens_used(),
            "output_chars": record.output.chars().count(),
        });
        let event = match &record.status {
            PhaseStatus::Completed => "phase_complete",
            PhaseStatus::Degraded { reason } => {
                payload["reason"] = Value::String(reason.clone());
                "phase_degraded"
            }
        };
        self.write(event, payload);
    }

    fn on_phase_failed(&self, phase: PhaseId, error: &str) {
        self.write(
            "phase_failed",
            json!({ "phase": phase.as_str(), "error": error }),
        );
    }

    fn on_cancelled(&self, phase: PhaseId) {
        self.write("cancelled", json!({ "phase": phase.as_str() }));
    }

    fn on_run_complete(&self, tokens_used: u64, degraded: &[PhaseId]) {
        self.write(
            "run_complete",
            json!({
                "tokens_used": tokens_used,
                "degraded_phases": degraded.iter().map(PhaseId::as_str).collect::<Vec<_>>(),
            }),
        );
    }
}

impl Drop for JsonlRunLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
