//! Ingestion progress reporting and cooperative cancellation.
//!
//! Progress is emitted on **stderr** so stdout remains parseable for
//! scripts. The download phase covers [0,50) percent and record processing
//! covers [50,100]; `complete` is always reported as 100.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Phase of the ingestion pipeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IngestStage {
    Downloading,
    Decompressing,
    Processing,
    Complete,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Downloading => "downloading",
            IngestStage::Decompressing => "decompressing",
            IngestStage::Processing => "processing",
            IngestStage::Complete => "complete",
        }
    }
}

/// A single progress event. `progress` is an integer percentage in 0..=100.
#[derive(Clone, Debug)]
pub struct IngestEvent {
    pub stage: IngestStage,
    pub progress: u8,
    pub message: String,
}

impl IngestEvent {
    pub fn new(stage: IngestStage, progress: u8, message: impl Into<String>) -> Self {
        IngestEvent {
            stage,
            progress: progress.min(100),
            message: message.into(),
        }
    }
}

/// Reports ingestion progress. Implementations write to stderr (human or JSON).
pub trait IngestProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the ingestion pipeline.
    fn report(&self, event: &IngestEvent);
}

/// Human-friendly progress on stderr: "ingest minimal  downloading  37%  12.4 MB / 33.1 MB".
pub struct StderrProgress;

impl IngestProgressReporter for StderrProgress {
    fn report(&self, event: &IngestEvent) {
        let line = format!(
            "ingest  {}  {:>3}%  {}\n",
            event.stage.as_str(),
            event.progress,
            event.message
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IngestProgressReporter for JsonProgress {
    fn report(&self, event: &IngestEvent) {
        let obj = serde_json::json!({
            "event": "progress",
            "stage": event.stage.as_str(),
            "progress": event.progress,
            "message": event.message,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IngestProgressReporter for NoProgress {
    fn report(&self, _event: &IngestEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller can pass it to ingest.
    pub fn reporter(&self) -> Box<dyn IngestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

/// Cooperative cancellation signal. The pipeline checks this between
/// download chunks and between record batches; there is no resumable
/// byte-range download, so cancelling is a best-effort stop.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
