//! # Canvas
//!
//! The drawing capability the layout engine renders onto. The engine never
//! produces bytes itself; it decides *where* things go and calls a
//! [`Canvas`] to put them there.
//!
//! All coordinates are PDF user space in points: origin at the bottom-left
//! corner of the page, y growing upward. Text is positioned by its baseline.
//!
//! Two implementations ship with the crate:
//! - [`RecordingCanvas`] keeps every call as a serializable [`DrawOp`].
//! - [`PdfCanvas`] writes a PDF file.

pub mod pdf;
pub mod recording;

use serde::{Deserialize, Serialize};

pub use pdf::PdfCanvas;
pub use recording::{DrawOp, RecordedPage, RecordingCanvas};

use crate::error::CanvasError;
use crate::font::{FontSpec, TextMeasure};
use crate::image_loader::LoadedImage;
use crate::style::Color;

/// An axis-aligned rectangle; (`x`, `y`) is its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its top-left corner, the natural anchor when
    /// laying out downward from a cursor.
    pub fn from_top(x: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(x, top - height, width, height)
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On/off lengths of a dashed stroke, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashPattern {
    pub segment: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
    /// `None` draws a solid line.
    pub dash: Option<DashPattern>,
}

impl Stroke {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }
}

/// A drawing backend.
///
/// A canvas holds at most one open page. Every drawing call targets that
/// page and fails with [`CanvasError::NoOpenPage`] when none is open.
pub trait Canvas: TextMeasure {
    /// Open a new page of the given size.
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), CanvasError>;

    /// Finish the open page and release its drawing context.
    fn end_page(&mut self) -> Result<(), CanvasError>;

    /// Draw one line of text with its baseline starting at (`x`, `y`).
    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &FontSpec,
        color: Color,
    ) -> Result<(), CanvasError>;

    /// Draw text rotated counter-clockwise by `angle` degrees around its
    /// baseline origin.
    fn draw_text_rotated(
        &mut self,
        x: f64,
        y: f64,
        angle: f64,
        text: &str,
        font: &FontSpec,
        color: Color,
    ) -> Result<(), CanvasError>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError>;

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) -> Result<(), CanvasError>;

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) -> Result<(), CanvasError>;

    /// Draw an image scaled to fill `rect`.
    fn draw_image(&mut self, image: &LoadedImage, rect: Rect) -> Result<(), CanvasError>;
}
