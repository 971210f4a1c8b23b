//! # Pagewright
//!
//! A page-aware layout engine for paginated PDF reports.
//!
//! Content is placed with a vertical cursor that knows where the page ends.
//! Before anything of known height is drawn, the engine checks whether it
//! fits below the cursor and starts a new page if not. Paragraphs move as a
//! unit or flow line by line, headings stay with what follows them, and
//! tables repeat their header row on every page they span.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      Report: page setup, decorations, blocks
//!       ↓
//!   [paginator]  Cursor, space checks, page breaks
//!       ↓
//!   [text] [table] [content]   Wrapping, tables, images, barcodes
//!       ↓
//!   [canvas]     Drawing backend: PDF writer or recorded draw log
//! ```
//!
//! The engine never writes bytes itself. It drives a [`canvas::Canvas`],
//! so the same layout can be rendered to PDF or recorded for inspection.

pub mod canvas;
pub mod content;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image_loader;
pub mod model;
pub mod paginator;
pub mod style;
pub mod table;
pub mod text;

use tracing::info;

use canvas::{PdfCanvas, RecordedPage, RecordingCanvas};
use error::LayoutError;
use model::{layout_report, Report};

pub use error::Result;

/// Render a report to PDF bytes.
///
/// This is the primary entry point.
pub fn render(report: &Report) -> Result<Vec<u8>> {
    let mut canvas = PdfCanvas::new();
    let pages = layout_report(report, &mut canvas)?;
    let bytes = canvas
        .finish(&report.metadata)
        .map_err(|source| LayoutError::Failed {
            page: pages,
            operation: "finish",
            source,
        })?;
    info!(pages, bytes = bytes.len(), "report rendered");
    Ok(bytes)
}

/// Render a report described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let report: Report = serde_json::from_str(json)?;
    render(&report)
}

/// Lay out a report without producing a PDF and return the recorded draw
/// calls of every page.
pub fn layout(report: &Report) -> Result<Vec<RecordedPage>> {
    let mut canvas = RecordingCanvas::new();
    let pages = layout_report(report, &mut canvas)?;
    info!(pages, "report laid out");
    Ok(canvas.into_pages())
}

/// Like [`layout`], for a JSON report.
pub fn layout_json(json: &str) -> Result<Vec<RecordedPage>> {
    let report: Report = serde_json::from_str(json)?;
    layout(&report)
}
