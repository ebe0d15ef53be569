//! `equipment-analysis` is a small library implementing the CSV analysis and
//! history pipeline for chemical-equipment sensor logs: parse an uploaded CSV
//! into an in-memory [`types::TabularDataset`], compute summary statistics,
//! persist the result in a recency-ordered [`history::HistoryStore`], and
//! render a PDF report for the latest analysis.
//!
//! The primary entrypoint is [`pipeline::Pipeline`], which serves the three
//! request boundaries:
//!
//! - `handle_upload(bytes, filename)` → persisted [`types::SummaryRecord`]
//! - `handle_history_query(n)` → recent records, newest first (default window 5)
//! - `handle_report_request()` → PDF bytes for the latest record
//!
//! ## What an upload produces
//!
//! For a CSV with `Pressure`, `Temperature`, `Flowrate`, and `Type` columns,
//! summarization yields:
//!
//! - `total_count`: row count (zero rows is an error, never a record of 0.0 means)
//! - `avg_pressure` / `avg_temperature` / `avg_flowrate`: arithmetic means
//! - `type_distribution`: occurrence count per distinct `Type` label
//! - `row_preview`: the first 10 rows, copied verbatim
//!
//! A missing required column fails with [`error::AnalysisError::MissingColumn`]
//! naming the column, and nothing is persisted.
//!
//! ## Quick example: upload, history, report
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use equipment_analysis::history::HistoryStore;
//! use equipment_analysis::pipeline::{Pipeline, PipelineOptions};
//! use equipment_analysis::report::PdfReportRenderer;
//!
//! # fn main() -> Result<(), equipment_analysis::AnalysisError> {
//! let store = Arc::new(HistoryStore::new());
//! let pipeline = Pipeline::new(
//!     store,
//!     Box::new(PdfReportRenderer::new()),
//!     PipelineOptions::default(),
//! );
//!
//! let csv = "Pressure,Temperature,Flowrate,Type\n10,90,5,Pump\n20,110,7,Valve\n";
//! let record = pipeline.handle_upload(csv.as_bytes(), "readings.csv")?;
//! assert_eq!(record.summary.total_count, 2);
//! assert_eq!(record.summary.avg_pressure, 15.0);
//! assert_eq!(record.summary.type_distribution["Pump"], 1);
//!
//! // Newest first, previews stripped to bound payload size.
//! let history = pipeline.handle_history_query(None);
//! assert_eq!(history.len(), 1);
//! assert!(history[0].summary.row_preview.is_none());
//!
//! let doc = pipeline.handle_report_request()?;
//! assert!(doc.bytes.starts_with(b"%PDF"));
//! assert_eq!(doc.content_type, "application/pdf");
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Attach a [`pipeline::PipelineObserver`] via [`pipeline::PipelineOptions`] to
//! receive stage transitions (`Received → Parsed → Summarized → Persisted →
//! Responded`), success stats, and failure/alert callbacks. Ready-made
//! observers: [`pipeline::StdErrObserver`], [`pipeline::FileObserver`], and
//! [`pipeline::CompositeObserver`].
//!
//! ## Durable history
//!
//! [`history::HistoryStore::with_snapshot`] backs the store with a JSON file:
//! the snapshot is loaded on open and rewritten with each append,
//! so a restarted process serves the same history.
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV parsing into an in-memory table
//! - [`analysis`]: summary statistics and the type distribution
//! - [`history`]: recency-ordered record store
//! - [`report`]: report contract and the lopdf-backed PDF renderer
//! - [`pipeline`]: orchestrator and observability hooks
//! - [`types`]: data model
//! - [`error`]: error types used across the crate

pub mod analysis;
pub mod error;
pub mod history;
pub mod ingestion;
pub mod pipeline;
pub mod report;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
