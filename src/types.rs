//! Core data model types for the analysis pipeline.
//!
//! CSV uploads are parsed into an in-memory [`TabularDataset`]; summarization
//! produces a [`Summary`], which the history store turns into an immutable
//! [`SummaryRecord`] by attaching caller context (filename, id, timestamp).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single cell value in a [`TabularDataset`].
///
/// Serializes untagged, so previews round-trip as plain JSON scalars
/// (`null` / number / string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty cell.
    Null,
    /// Numeric cell (all numbers are carried as `f64`).
    Number(f64),
    /// Textual cell.
    Text(String),
}

impl Value {
    /// Coerce this value to a float, if possible.
    ///
    /// `Text` is coerced via parsing; `Null` yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    /// Categorical label for this value, used when grouping.
    ///
    /// `Null` maps to the empty label so every row contributes to a distribution.
    pub fn label(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// In-memory tabular dataset parsed from one upload.
///
/// Rows are stored row-major in the same order as `columns`. Invariant: every
/// row has exactly `columns.len()` cells (enforced at parse time).
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    /// Ordered column names from the header row.
    pub columns: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Value>>,
}

impl TabularDataset {
    /// Create a dataset from a header and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy the first `limit` rows (verbatim, original order) into a preview.
    pub fn preview(&self, limit: usize) -> RowPreview {
        RowPreview {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}

/// A bounded, verbatim copy of the leading rows of a source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPreview {
    /// Ordered column names from the source header.
    pub columns: Vec<String>,
    /// Leading source rows, unmodified.
    pub rows: Vec<Vec<Value>>,
}

impl RowPreview {
    /// Number of preview rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Derived statistics for one dataset, before caller context is attached.
///
/// Produced by [`crate::analysis::summarize`]; `filename`/`id`/`uploaded_at`
/// are populated by the history store at append time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of data rows in the source table.
    pub total_count: u64,
    /// Arithmetic mean of the `Pressure` column.
    pub avg_pressure: f64,
    /// Arithmetic mean of the `Temperature` column.
    pub avg_temperature: f64,
    /// Arithmetic mean of the `Flowrate` column.
    pub avg_flowrate: f64,
    /// Occurrence count per distinct `Type` label; values sum to `total_count`.
    pub type_distribution: BTreeMap<String, u64>,
    /// Up to the first 10 source rows, if retained.
    pub row_preview: Option<RowPreview>,
}

/// Opaque, strictly increasing identifier assigned by the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted result of summarizing one uploaded dataset.
///
/// Immutable once created; uniquely identified by `id` + `uploaded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Store-assigned identifier, strictly increasing per store.
    pub id: RecordId,
    /// Source filename supplied at upload.
    pub filename: String,
    /// Upload instant, monotonically non-decreasing across records in a store.
    pub uploaded_at: DateTime<Utc>,
    /// Derived statistics and optional preview.
    #[serde(flatten)]
    pub summary: Summary,
}

impl SummaryRecord {
    /// Copy of this record with the row preview stripped.
    ///
    /// History listings use this to bound payload size.
    pub fn without_preview(&self) -> Self {
        let mut out = self.clone();
        out.summary.row_preview = None;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_coercion_rules() {
        assert_eq!(Value::Number(4.5).as_number(), Some(4.5));
        assert_eq!(Value::Text("12.5".to_string()).as_number(), Some(12.5));
        assert_eq!(Value::Text("Pump".to_string()).as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn value_labels_are_stable() {
        assert_eq!(Value::Text("Valve".to_string()).label(), "Valve");
        assert_eq!(Value::Number(3.0).label(), "3");
        assert_eq!(Value::Number(3.25).label(), "3.25");
        assert_eq!(Value::Null.label(), "");
    }

    #[test]
    fn preview_copies_leading_rows_verbatim() {
        let ds = TabularDataset::new(
            vec!["a".to_string()],
            vec![
                vec![Value::Number(1.0)],
                vec![Value::Number(2.0)],
                vec![Value::Number(3.0)],
            ],
        );
        let p = ds.preview(2);
        assert_eq!(p.row_count(), 2);
        assert_eq!(p.rows, ds.rows[..2].to_vec());
    }
}
