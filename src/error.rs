//! Structured error types for the layout engine.
//!
//! `CanvasError` is what a drawing backend reports. `LayoutError` is what the
//! engine reports to its callers: configuration problems, rejected input,
//! misuse of a closed paginator, and canvas failures wrapped with the page
//! and operation they happened in.

use thiserror::Error;

/// Failures reported by a [`Canvas`](crate::canvas::Canvas) implementation.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("no page is open")]
    NoOpenPage,

    #[error("a page is already open")]
    PageAlreadyOpen,

    #[error("image could not be embedded: {0}")]
    Image(String),

    #[error("barcode could not be encoded: {0}")]
    Barcode(String),
}

/// The unified error type returned by all public engine operations.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Margins leave no usable area on the page.
    #[error("degenerate page: usable area is {width:.2} x {height:.2} pt after margins")]
    DegeneratePage { width: f64, height: f64 },

    /// Table input that cannot be laid out (ragged rows, bad column ratios).
    #[error("malformed table: {0}")]
    MalformedTable(String),

    /// A style value outside its valid range.
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    /// An operation was invoked after the paginator was closed.
    #[error("`{operation}` called on a closed paginator")]
    Closed { operation: &'static str },

    /// The drawing context of a page could not be released.
    #[error("failed to release page {page}: {source}")]
    Release {
        page: usize,
        #[source]
        source: CanvasError,
    },

    /// A drawing operation failed.
    #[error("layout failed on page {page} during {operation}: {source}")]
    Failed {
        page: usize,
        operation: &'static str,
        #[source]
        source: CanvasError,
    },

    /// JSON input failed to parse as a report.
    #[error("failed to parse report: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check block types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
