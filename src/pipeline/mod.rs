//! Pipeline orchestrator.
//!
//! [`Pipeline`] wires the table reader, summarizer, and history store together
//! and serves the three request boundaries:
//!
//! - [`Pipeline::handle_upload`]: CSV bytes + filename → persisted [`SummaryRecord`]
//! - [`Pipeline::handle_history_query`]: recent records, newest first
//! - [`Pipeline::handle_report_request`]: PDF report for the latest record
//!
//! Each upload moves through `Received → Parsed → Summarized → Persisted →
//! Responded`; any failure short-circuits before persistence, so no partial
//! record is ever stored. Stage transitions and outcomes are reported to an
//! optional [`PipelineObserver`].

mod observer;

use std::fmt;
use std::sync::Arc;

use crate::analysis::summarize;
use crate::error::{AnalysisError, AnalysisResult};
use crate::history::{HistoryStore, DEFAULT_HISTORY_WINDOW};
use crate::ingestion::parse_csv_bytes;
use crate::report::{RenderedDocument, ReportRenderer};
use crate::types::SummaryRecord;

pub use observer::{
    AnalysisSeverity, CompositeObserver, FileObserver, PipelineObserver, StdErrObserver,
    UploadContext, UploadStage, UploadStats,
};

/// Options controlling pipeline behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Number of records returned by a history query with no explicit count.
    pub history_window: usize,
    /// Whether persisted records keep their bounded row preview.
    pub retain_preview: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: AnalysisSeverity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("history_window", &self.history_window)
            .field("retain_preview", &self.retain_preview)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            retain_preview: true,
            observer: None,
            alert_at_or_above: AnalysisSeverity::Critical,
        }
    }
}

/// Orchestrator wiring reader → summarizer → store, plus report serving.
pub struct Pipeline {
    store: Arc<HistoryStore>,
    renderer: Box<dyn ReportRenderer>,
    opts: PipelineOptions,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("records", &self.store.len())
            .field("opts", &self.opts)
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline over an explicitly owned store and renderer.
    pub fn new(
        store: Arc<HistoryStore>,
        renderer: Box<dyn ReportRenderer>,
        opts: PipelineOptions,
    ) -> Self {
        Self {
            store,
            renderer,
            opts,
        }
    }

    /// The history store backing this pipeline.
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Process one upload: parse, summarize, persist, respond.
    ///
    /// The raw bytes are parsed exactly once; the same in-memory table feeds
    /// both summarization and the bounded preview. On any failure the error is
    /// returned as-is and nothing is persisted.
    pub fn handle_upload(&self, bytes: &[u8], filename: &str) -> AnalysisResult<SummaryRecord> {
        let ctx = UploadContext {
            filename: filename.to_owned(),
        };
        self.stage(&ctx, UploadStage::Received);

        match self.process_upload(bytes, &ctx) {
            Ok(record) => {
                if let Some(obs) = self.opts.observer.as_ref() {
                    obs.on_success(
                        &ctx,
                        UploadStats {
                            rows: record.summary.total_count as usize,
                            record_id: record.id,
                        },
                    );
                }
                self.stage(&ctx, UploadStage::Responded);
                Ok(record)
            }
            Err(e) => {
                if let Some(obs) = self.opts.observer.as_ref() {
                    let sev = severity_for_error(&e);
                    obs.on_failure(&ctx, sev, &e);
                    if sev >= self.opts.alert_at_or_above {
                        obs.on_alert(&ctx, sev, &e);
                    }
                }
                Err(e)
            }
        }
    }

    fn process_upload(&self, bytes: &[u8], ctx: &UploadContext) -> AnalysisResult<SummaryRecord> {
        let dataset = parse_csv_bytes(bytes)?;
        self.stage(ctx, UploadStage::Parsed);

        let mut summary = summarize(&dataset)?;
        self.stage(ctx, UploadStage::Summarized);
        if !self.opts.retain_preview {
            summary.row_preview = None;
        }

        // The response carries the id/timestamp the store assigned, without a
        // read-back that could observe another request's record.
        let record = self.store.append(&ctx.filename, summary)?;
        self.stage(ctx, UploadStage::Persisted);
        Ok(record)
    }

    /// The most recent records, newest first, previews stripped.
    ///
    /// `n` defaults to [`PipelineOptions::history_window`].
    pub fn handle_history_query(&self, n: Option<usize>) -> Vec<SummaryRecord> {
        let window = n.unwrap_or(self.opts.history_window);
        self.store
            .recent(window)
            .into_iter()
            .map(|r| r.without_preview())
            .collect()
    }

    /// Render a report for the latest analysis.
    ///
    /// Fails with [`AnalysisError::NotFound`] when history is empty; that is a
    /// normal outcome for a fresh store, not a crash.
    pub fn handle_report_request(&self) -> AnalysisResult<RenderedDocument> {
        let latest = self.store.latest()?;
        self.renderer
            .render(&latest, latest.summary.row_preview.as_ref())
    }

    fn stage(&self, ctx: &UploadContext, stage: UploadStage) {
        if let Some(obs) = self.opts.observer.as_ref() {
            obs.on_stage(ctx, stage);
        }
    }
}

fn severity_for_error(e: &AnalysisError) -> AnalysisSeverity {
    match e {
        AnalysisError::Io(_) | AnalysisError::Persistence { .. } => AnalysisSeverity::Critical,
        AnalysisError::MalformedInput { .. }
        | AnalysisError::Coercion { .. }
        | AnalysisError::MissingColumn { .. }
        | AnalysisError::EmptyDataset
        | AnalysisError::NotFound
        | AnalysisError::Render(_) => AnalysisSeverity::Error,
    }
}
