//! A canvas that records draw calls instead of rendering them.
//!
//! The recorded pages serialize to JSON, which makes the layout inspectable
//! from the CLI (`--layout`) and gives tests something precise to assert on.

use serde::Serialize;

use super::{Canvas, Point, Rect, Stroke};
use crate::error::CanvasError;
use crate::font::{FontContext, FontSpec, TextMeasure};
use crate::image_loader::LoadedImage;
use crate::style::Color;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: FontSpec,
        color: Color,
    },
    RotatedText {
        x: f64,
        y: f64,
        angle: f64,
        text: String,
        font: FontSpec,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Image {
        rect: Rect,
        width_px: u32,
        height_px: u32,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
    /// Whether `end_page` was called for this page.
    pub closed: bool,
}

impl RecordedPage {
    /// Text of every (unrotated) text op, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fill colors of every `FillRect`, in drawing order.
    pub fn fills(&self) -> Vec<(Rect, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    fonts: FontContext,
    pages: Vec<RecordedPage>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontContext) -> Self {
        Self {
            fonts,
            pages: Vec::new(),
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<RecordedPage> {
        self.pages
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.pages)
    }

    fn open_page(&mut self) -> Result<&mut RecordedPage, CanvasError> {
        match self.pages.last_mut() {
            Some(page) if !page.closed => Ok(page),
            _ => Err(CanvasError::NoOpenPage),
        }
    }

    fn record(&mut self, op: DrawOp) -> Result<(), CanvasError> {
        self.open_page()?.ops.push(op);
        Ok(())
    }
}

impl TextMeasure for RecordingCanvas {
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.fonts.measure_text(text, font)
    }
}

impl Canvas for RecordingCanvas {
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        if self.open_page().is_ok() {
            return Err(CanvasError::PageAlreadyOpen);
        }
        self.pages.push(RecordedPage {
            width,
            height,
            ops: Vec::new(),
            closed: false,
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), CanvasError> {
        self.open_page()?.closed = true;
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &FontSpec,
        color: Color,
    ) -> Result<(), CanvasError> {
        self.record(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: font.clone(),
            color,
        })
    }

    fn draw_text_rotated(
        &mut self,
        x: f64,
        y: f64,
        angle: f64,
        text: &str,
        font: &FontSpec,
        color: Color,
    ) -> Result<(), CanvasError> {
        self.record(DrawOp::RotatedText {
            x,
            y,
            angle,
            text: text.to_string(),
            font: font.clone(),
            color,
        })
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError> {
        self.record(DrawOp::FillRect { rect, color })
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) -> Result<(), CanvasError> {
        self.record(DrawOp::StrokeRect {
            rect,
            stroke: *stroke,
        })
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) -> Result<(), CanvasError> {
        self.record(DrawOp::Line {
            from,
            to,
            stroke: *stroke,
        })
    }

    fn draw_image(&mut self, image: &LoadedImage, rect: Rect) -> Result<(), CanvasError> {
        self.record(DrawOp::Image {
            rect,
            width_px: image.width_px,
            height_px: image.height_px,
        })
    }
}
