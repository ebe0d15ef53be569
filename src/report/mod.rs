//! Report generation for persisted analyses.
//!
//! The pipeline talks to a [`ReportRenderer`] through a narrow contract: given
//! one [`SummaryRecord`] and an optional row source, produce a
//! [`RenderedDocument`]. The default implementation is the lopdf-backed
//! [`PdfReportRenderer`].

pub mod pdf;

use crate::error::AnalysisResult;
use crate::types::{RecordId, RowPreview, SummaryRecord};

pub use pdf::PdfReportRenderer;

/// Content type of rendered PDF reports.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Maximum number of source rows rendered in the report's detail table.
pub const DETAIL_ROW_LIMIT: usize = 20;

/// Average temperature above which the report flags the metric as `HIGH`.
pub const TEMPERATURE_HIGH_THRESHOLD: f64 = 100.0;

/// Status flag for an average temperature reading.
pub fn temperature_status(avg_temperature: f64) -> &'static str {
    if avg_temperature > TEMPERATURE_HIGH_THRESHOLD {
        "HIGH"
    } else {
        "Normal"
    }
}

/// Download filename for the report of a record.
pub fn report_filename(id: RecordId) -> String {
    format!("Report_{id}.pdf")
}

/// A rendered document ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Suggested download filename (`Report_<id>.pdf`).
    pub filename: String,
    /// MIME content type.
    pub content_type: &'static str,
    /// Document bytes.
    pub bytes: Vec<u8>,
}

/// Document-generation collaborator invoked by the pipeline.
pub trait ReportRenderer: Send + Sync {
    /// Render a document for `record`.
    ///
    /// `rows` is an optional row source for the detail table; when `None`, the
    /// document notes that source data is unavailable.
    fn render(
        &self,
        record: &SummaryRecord,
        rows: Option<&RowPreview>,
    ) -> AnalysisResult<RenderedDocument>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_status_threshold() {
        assert_eq!(temperature_status(100.0), "Normal");
        assert_eq!(temperature_status(100.1), "HIGH");
        assert_eq!(temperature_status(42.0), "Normal");
    }

    #[test]
    fn report_filename_uses_record_id() {
        assert_eq!(report_filename(RecordId(7)), "Report_7.pdf");
    }
}
