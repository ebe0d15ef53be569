//! PDF rendering via lopdf.
//!
//! Produces a single-page letter document: title, filename/date header, an
//! executive-summary metrics table, and either a detail table of source rows
//! or a note that source data is unavailable.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::AnalysisResult;
use crate::types::{RowPreview, SummaryRecord};

use super::{
    report_filename, temperature_status, RenderedDocument, ReportRenderer, DETAIL_ROW_LIMIT,
    PDF_CONTENT_TYPE,
};

// Letter page, points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN_LEFT: i64 = 50;
const TOP_Y: i64 = 760;

const TITLE_SIZE: i64 = 18;
const HEADING_SIZE: i64 = 13;
const BODY_SIZE: i64 = 10;
const DETAIL_SIZE: i64 = 8;

/// Renders reports as PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(
        &self,
        record: &SummaryRecord,
        rows: Option<&RowPreview>,
    ) -> AnalysisResult<RenderedDocument> {
        let bytes = build_pdf(record, rows)?;
        Ok(RenderedDocument {
            filename: report_filename(record.id),
            content_type: PDF_CONTENT_TYPE,
            bytes,
        })
    }
}

/// One laid-out text line.
struct Line {
    text: String,
    size: i64,
    bold: bool,
    gap_after: i64,
}

impl Line {
    fn new(text: impl Into<String>, size: i64, bold: bool, gap_after: i64) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
            gap_after,
        }
    }
}

fn build_pdf(record: &SummaryRecord, rows: Option<&RowPreview>) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // WinAnsiEncoding so the unit glyphs (degree sign, superscript three)
    // render from single-byte codes.
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
            "F2" => bold_font_id,
        },
    });

    let content = Content {
        operations: layout_operations(&report_lines(record, rows)),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn report_lines(record: &SummaryRecord, rows: Option<&RowPreview>) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.push(Line::new(
        "Chemical Equipment Analysis Report",
        TITLE_SIZE,
        true,
        10,
    ));
    lines.push(Line::new(
        format!("Filename: {}", record.filename),
        BODY_SIZE,
        false,
        2,
    ));
    lines.push(Line::new(
        format!(
            "Processed Date: {}",
            record.uploaded_at.format("%Y-%m-%d %H:%M")
        ),
        BODY_SIZE,
        false,
        14,
    ));

    lines.push(Line::new("1. Executive Summary", HEADING_SIZE, true, 6));
    lines.push(Line::new(
        format!("{:<22}{:<16}{}", "Metric", "Value", "Status"),
        BODY_SIZE,
        true,
        2,
    ));
    let s = &record.summary;
    lines.push(Line::new(
        format!(
            "{:<22}{:<16}{}",
            "Avg Pressure",
            format!("{:.2} bar", s.avg_pressure),
            "Normal"
        ),
        BODY_SIZE,
        false,
        2,
    ));
    lines.push(Line::new(
        format!(
            "{:<22}{:<16}{}",
            "Avg Temperature",
            format!("{:.2} °C", s.avg_temperature),
            temperature_status(s.avg_temperature)
        ),
        BODY_SIZE,
        false,
        2,
    ));
    lines.push(Line::new(
        format!(
            "{:<22}{:<16}{}",
            "Avg Flow Rate",
            format!("{:.2} m³/h", s.avg_flowrate),
            "Normal"
        ),
        BODY_SIZE,
        false,
        14,
    ));

    lines.push(Line::new(
        format!("2. Detailed Sensor Logs (Top {DETAIL_ROW_LIMIT} Rows)"),
        HEADING_SIZE,
        true,
        6,
    ));
    match rows {
        Some(preview) if preview.row_count() > 0 => {
            lines.push(Line::new(preview.columns.join("  "), DETAIL_SIZE, true, 2));
            for row in preview.rows.iter().take(DETAIL_ROW_LIMIT) {
                let rendered = row
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("  ");
                lines.push(Line::new(rendered, DETAIL_SIZE, false, 2));
            }
        }
        _ => {
            lines.push(Line::new(
                "Source rows were not retained. Only summary metrics are available.",
                BODY_SIZE,
                false,
                2,
            ));
        }
    }

    lines
}

fn layout_operations(lines: &[Line]) -> Vec<Operation> {
    let mut ops = Vec::new();
    let mut y = TOP_Y;

    for line in lines {
        ops.push(Operation::new("BT", vec![]));
        let font = if line.bold { "F2" } else { "F1" };
        ops.push(Operation::new(
            "Tf",
            vec![font.into(), line.size.into()],
        ));
        ops.push(Operation::new("Td", vec![MARGIN_LEFT.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
        y -= line.size + line.gap_after;
    }

    ops
}

/// Encode text for a WinAnsiEncoding string literal.
///
/// WinAnsi agrees with Latin-1 on every code point this report emits; anything
/// outside the single-byte range is replaced.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF { code as u8 } else { b'?' }
        })
        .collect()
}
