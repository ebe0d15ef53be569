//! CSV parsing implementation.

use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{TabularDataset, Value};

/// Parse raw CSV bytes into an in-memory [`TabularDataset`].
///
/// Rules:
///
/// - The first record is the header row and supplies column names.
/// - Every data row must have the same number of cells as the header.
/// - Cell typing: empty cells map to [`Value::Null`], cells that parse as a
///   float map to [`Value::Number`], everything else to [`Value::Text`].
///
/// Ragged rows, invalid UTF-8, and a missing header row fail with
/// [`AnalysisError::MalformedInput`].
pub fn parse_csv_bytes(bytes: &[u8]) -> AnalysisResult<TabularDataset> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);
    parse_csv_reader(&mut rdr)
}

/// Parse a CSV file on disk into an in-memory [`TabularDataset`].
pub fn parse_csv_path(path: impl AsRef<Path>) -> AnalysisResult<TabularDataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(map_csv_error)?;
    parse_csv_reader(&mut rdr)
}

/// Parse CSV data from an existing CSV reader.
pub fn parse_csv_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> AnalysisResult<TabularDataset> {
    let headers = rdr.headers().map_err(map_csv_error)?.clone();
    if headers.is_empty() {
        return Err(AnalysisError::MalformedInput {
            message: "input has no header row".to_string(),
        });
    }

    let columns: Vec<String> = headers.iter().map(str::to_owned).collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(map_csv_error)?;
        let row: Vec<Value> = record.iter().map(parse_cell).collect();
        rows.push(row);
    }

    Ok(TabularDataset::new(columns, rows))
}

fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => Value::Number(v),
        Err(_) => Value::Text(trimmed.to_owned()),
    }
}

fn map_csv_error(e: csv::Error) -> AnalysisError {
    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => AnalysisError::Io(io),
            _ => unreachable!("kind checked above"),
        }
    } else {
        // UnequalLengths, Utf8, etc: the byte stream does not form a consistent table.
        AnalysisError::MalformedInput {
            message: e.to_string(),
        }
    }
}
