use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type returned across the analysis pipeline.
///
/// This is a single error enum shared by CSV parsing, summarization, the history
/// store, and report rendering.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input bytes could not be split into a consistent header/row structure
    /// (ragged row lengths, invalid encoding, missing header row).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// A cell could not be coerced to a number for an aggregate computation.
    #[error("failed to coerce value at row {row} column '{column}' to a number (raw='{raw}')")]
    Coercion {
        row: usize,
        column: String,
        raw: String,
    },

    /// A required column is absent from the dataset header.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// The dataset has zero data rows, so column means are undefined.
    #[error("dataset is empty: summary statistics are undefined over zero rows")]
    EmptyDataset,

    /// The history store holds no records to serve.
    #[error("no analyses in history")]
    NotFound,

    /// The history snapshot could not be read or written.
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// PDF document assembly failed.
    #[error("report rendering failed: {0}")]
    Render(#[from] lopdf::Error),
}

impl AnalysisError {
    /// Name of the missing column, if this is a [`AnalysisError::MissingColumn`].
    pub fn missing_column(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column } => Some(column.as_str()),
            _ => None,
        }
    }
}
