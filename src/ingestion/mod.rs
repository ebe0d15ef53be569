//! Parsing of raw uploads into an in-memory [`crate::types::TabularDataset`].
//!
//! Uploads arrive as raw bytes; [`csv::parse_csv_bytes`] is the entrypoint used
//! by the pipeline. Reader- and path-based variants are also available for
//! callers that already hold a `csv::Reader` or a file on disk.

pub mod csv;

pub use self::csv::{parse_csv_bytes, parse_csv_path, parse_csv_reader};
