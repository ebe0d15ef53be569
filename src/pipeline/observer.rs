use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AnalysisError;
use crate::types::RecordId;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O or persistence failures).
    Critical,
}

/// Stages an upload passes through inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Raw bytes accepted.
    Received,
    /// Bytes parsed into a tabular dataset.
    Parsed,
    /// Summary statistics computed.
    Summarized,
    /// Record appended to the history store.
    Persisted,
    /// Result handed back to the caller.
    Responded,
}

/// Context about an upload being processed.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Filename supplied with the upload.
    pub filename: String,
}

/// Minimal stats reported on a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of data rows in the upload.
    pub rows: usize,
    /// Id assigned to the persisted record.
    pub record_id: RecordId,
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called as an upload reaches each stage.
    fn on_stage(&self, _ctx: &UploadContext, _stage: UploadStage) {}

    /// Called when an upload succeeds end to end.
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when an upload fails.
    fn on_failure(&self, _ctx: &UploadContext, _severity: AnalysisSeverity, _error: &AnalysisError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage(&self, ctx: &UploadContext, stage: UploadStage) {
        for o in &self.observers {
            o.on_stage(ctx, stage);
        }
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_stage(&self, ctx: &UploadContext, stage: UploadStage) {
        eprintln!("[upload][{:?}] file={}", stage, ctx.filename);
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        eprintln!(
            "[upload][ok] file={} rows={} record={}",
            ctx.filename, stats.rows, stats.record_id
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        eprintln!(
            "[upload][{:?}] file={} err={}",
            severity, ctx.filename, error
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        eprintln!(
            "[ALERT][upload][{:?}] file={} err={}",
            severity, ctx.filename, error
        );
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_stage(&self, ctx: &UploadContext, stage: UploadStage) {
        self.append_line(&format!(
            "{} stage={:?} file={}",
            unix_ts(),
            stage,
            ctx.filename
        ));
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        self.append_line(&format!(
            "{} ok file={} rows={} record={}",
            unix_ts(),
            ctx.filename,
            stats.rows,
            stats.record_id
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        self.append_line(&format!(
            "{} fail severity={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.filename,
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: AnalysisSeverity, error: &AnalysisError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} file={} err={}",
            unix_ts(),
            severity,
            ctx.filename,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
