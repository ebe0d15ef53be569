//! Summarization of a parsed [`TabularDataset`].
//!
//! [`summarize`] computes the per-upload statistics: row count, arithmetic means
//! of the sensor columns, the equipment-type distribution, and a bounded row
//! preview. Caller context (filename, id, timestamp) is attached later by the
//! history store.

use std::collections::BTreeMap;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Summary, TabularDataset, Value};

/// Sensor column holding pressure readings.
pub const PRESSURE_COLUMN: &str = "Pressure";
/// Sensor column holding temperature readings.
pub const TEMPERATURE_COLUMN: &str = "Temperature";
/// Sensor column holding flow-rate readings.
pub const FLOWRATE_COLUMN: &str = "Flowrate";
/// Categorical column holding the equipment type.
pub const TYPE_COLUMN: &str = "Type";

/// Maximum number of source rows copied into a record's preview.
pub const PREVIEW_ROW_LIMIT: usize = 10;

/// Summarize a dataset into derived statistics.
///
/// Rules:
///
/// - All of `Pressure`, `Temperature`, `Flowrate`, and `Type` must be present;
///   the first absent one (in that order) fails with
///   [`AnalysisError::MissingColumn`]. Column presence is checked before row
///   count, so a headers-only upload still reports its missing column.
/// - A dataset with zero rows fails with [`AnalysisError::EmptyDataset`] — a
///   mean over no readings is undefined, not `0.0`.
/// - Means coerce cells to floats ([`Value::as_number`]); null cells are
///   skipped, and a non-null cell that cannot be coerced fails with
///   [`AnalysisError::Coercion`] (1-based data row).
/// - The type distribution counts occurrences per distinct `Type` label; its
///   values sum to `total_count`.
/// - The preview is the first `min(10, total_count)` rows, copied verbatim.
pub fn summarize(dataset: &TabularDataset) -> AnalysisResult<Summary> {
    let pressure_idx = require_column(dataset, PRESSURE_COLUMN)?;
    let temperature_idx = require_column(dataset, TEMPERATURE_COLUMN)?;
    let flowrate_idx = require_column(dataset, FLOWRATE_COLUMN)?;
    let type_idx = require_column(dataset, TYPE_COLUMN)?;

    if dataset.row_count() == 0 {
        return Err(AnalysisError::EmptyDataset);
    }

    let avg_pressure = column_mean(dataset, pressure_idx, PRESSURE_COLUMN)?;
    let avg_temperature = column_mean(dataset, temperature_idx, TEMPERATURE_COLUMN)?;
    let avg_flowrate = column_mean(dataset, flowrate_idx, FLOWRATE_COLUMN)?;
    let type_distribution = type_distribution(dataset, type_idx);

    Ok(Summary {
        total_count: dataset.row_count() as u64,
        avg_pressure,
        avg_temperature,
        avg_flowrate,
        type_distribution,
        row_preview: Some(dataset.preview(PREVIEW_ROW_LIMIT)),
    })
}

fn require_column(dataset: &TabularDataset, name: &str) -> AnalysisResult<usize> {
    dataset
        .index_of(name)
        .ok_or_else(|| AnalysisError::MissingColumn {
            column: name.to_owned(),
        })
}

/// Arithmetic mean of one column, skipping null cells.
fn column_mean(dataset: &TabularDataset, idx: usize, column: &str) -> AnalysisResult<f64> {
    let mut sum = 0.0;
    let mut count = 0u64;

    for (row_idx0, row) in dataset.rows.iter().enumerate() {
        let cell = row.get(idx).unwrap_or(&Value::Null);
        if matches!(cell, Value::Null) {
            continue;
        }
        match cell.as_number() {
            Some(v) => {
                sum += v;
                count += 1;
            }
            None => {
                return Err(AnalysisError::Coercion {
                    row: row_idx0 + 1,
                    column: column.to_owned(),
                    raw: cell.to_string(),
                });
            }
        }
    }

    if count == 0 {
        // Every cell was null; there is nothing to average.
        return Err(AnalysisError::MalformedInput {
            message: format!("column '{column}' has no numeric values"),
        });
    }

    Ok(sum / count as f64)
}

fn type_distribution(dataset: &TabularDataset, idx: usize) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for row in &dataset.rows {
        let label = row.get(idx).unwrap_or(&Value::Null).label();
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
