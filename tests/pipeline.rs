use std::sync::Arc;

use equipment_analysis::history::HistoryStore;
use equipment_analysis::pipeline::{Pipeline, PipelineOptions};
use equipment_analysis::report::PdfReportRenderer;
use equipment_analysis::AnalysisError;

const READINGS: &str = "Pressure,Temperature,Flowrate,Type\n10,90,5,Pump\n20,110,7,Valve\n";

fn pipeline_with(opts: PipelineOptions) -> Pipeline {
    Pipeline::new(
        Arc::new(HistoryStore::new()),
        Box::new(PdfReportRenderer::new()),
        opts,
    )
}

#[test]
fn upload_parses_summarizes_and_persists() {
    let pipeline = pipeline_with(PipelineOptions::default());
    let record = pipeline
        .handle_upload(READINGS.as_bytes(), "readings.csv")
        .unwrap();

    assert_eq!(record.filename, "readings.csv");
    assert_eq!(record.summary.total_count, 2);
    assert_eq!(record.summary.avg_temperature, 100.0);
    assert_eq!(record.summary.row_preview.as_ref().unwrap().row_count(), 2);

    // Read-your-write against the store.
    let latest = pipeline.store().latest().unwrap();
    assert_eq!(latest.id, record.id);
}

#[test]
fn concurrent_uploads_each_respond_with_their_own_record() {
    let pipeline = Arc::new(pipeline_with(PipelineOptions::default()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                let name = format!("f{i}.csv");
                let record = pipeline.handle_upload(READINGS.as_bytes(), &name).unwrap();
                // The response is the record this request persisted, not
                // whichever record happens to be latest.
                assert_eq!(record.filename, name);
                record.id
            })
        })
        .collect();

    let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(pipeline.store().len(), 8);
}

#[test]
fn failed_upload_persists_nothing() {
    let pipeline = pipeline_with(PipelineOptions::default());
    assert!(pipeline.store().is_empty());

    let missing_flowrate = "Pressure,Temperature,Type\n10,90,Pump\n";
    let err = pipeline
        .handle_upload(missing_flowrate.as_bytes(), "bad.csv")
        .unwrap_err();
    assert_eq!(err.missing_column(), Some("Flowrate"));
    assert!(pipeline.store().is_empty());

    let malformed = "a,b\n1\n";
    let err = pipeline
        .handle_upload(malformed.as_bytes(), "ragged.csv")
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    assert!(pipeline.store().is_empty());
}

#[test]
fn history_query_defaults_to_window_of_five() {
    let pipeline = pipeline_with(PipelineOptions::default());
    for i in 0..7 {
        pipeline
            .handle_upload(READINGS.as_bytes(), &format!("f{i}.csv"))
            .unwrap();
    }

    let history = pipeline.handle_history_query(None);
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].filename, "f6.csv");
    assert_eq!(history[4].filename, "f2.csv");

    let two = pipeline.handle_history_query(Some(2));
    assert_eq!(two.len(), 2);
    assert_eq!(two[0].filename, "f6.csv");
}

#[test]
fn history_query_strips_previews() {
    let pipeline = pipeline_with(PipelineOptions::default());
    pipeline
        .handle_upload(READINGS.as_bytes(), "readings.csv")
        .unwrap();

    let history = pipeline.handle_history_query(None);
    assert!(history[0].summary.row_preview.is_none());

    // The persisted record itself still carries the preview for reports.
    let latest = pipeline.store().latest().unwrap();
    assert!(latest.summary.row_preview.is_some());
}

#[test]
fn history_query_on_empty_store_is_empty_not_an_error() {
    let pipeline = pipeline_with(PipelineOptions::default());
    assert!(pipeline.handle_history_query(None).is_empty());
}

#[test]
fn report_request_on_empty_history_is_not_found() {
    let pipeline = pipeline_with(PipelineOptions::default());
    let err = pipeline.handle_report_request().unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound));
}

#[test]
fn retain_preview_off_persists_stats_only() {
    let pipeline = pipeline_with(PipelineOptions {
        retain_preview: false,
        ..Default::default()
    });
    let record = pipeline
        .handle_upload(READINGS.as_bytes(), "readings.csv")
        .unwrap();

    assert!(record.summary.row_preview.is_none());
    assert_eq!(record.summary.total_count, 2);
}
