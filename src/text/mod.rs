//! # Text Flow
//!
//! Greedy word wrapping and placement of wrapped lines.
//!
//! [`wrap`] is lazy: it measures one candidate line at a time and yields
//! lines as they are completed. Words are separated by single spaces in the
//! output; runs of whitespace in the input collapse. A `\n` always ends the
//! current line, and an empty paragraph between two newlines yields an empty
//! line. A word wider than the available width is put on a line of its own
//! and never hyphenated.
//!
//! The paginator-level operations ([`Paginator::write_text`] and friends)
//! wrap first, so the height of a block is known before any space check.

use std::str::{Split, SplitWhitespace};

use crate::canvas::{Canvas, Rect};
use crate::error::{CanvasError, Result};
use crate::font::{FontSpec, TextMeasure};
use crate::paginator::Paginator;
use crate::style::{HAlign, TextStyle, VAlign};

/// Tolerance for the fit test, so a line exactly as wide as the box is not
/// pushed to the next line by rounding.
const FIT_EPSILON: f64 = 1e-6;

/// Ascent of the standard fonts as a fraction of the font size.
const ASCENT: f64 = 0.8;

/// Lazily wrap `text` into lines no wider than `max_width`.
pub fn wrap<'a, M: TextMeasure + ?Sized>(
    text: &'a str,
    max_width: f64,
    font: &'a FontSpec,
    measure: &'a M,
) -> WrappedLines<'a, M> {
    // Whitespace-only text has no lines at all, not one empty line.
    let body = if text.trim().is_empty() {
        ""
    } else {
        text.trim_end()
    };
    let mut paragraphs = body.split('\n');
    if body.is_empty() {
        paragraphs.next();
    }
    WrappedLines {
        measure,
        font,
        max_width,
        paragraphs,
        words: None,
        pending: None,
    }
}

pub struct WrappedLines<'a, M: TextMeasure + ?Sized> {
    measure: &'a M,
    font: &'a FontSpec,
    max_width: f64,
    paragraphs: Split<'a, char>,
    words: Option<SplitWhitespace<'a>>,
    /// A word that overflowed the previous line and starts the next one.
    pending: Option<&'a str>,
}

impl<'a, M: TextMeasure + ?Sized> Iterator for WrappedLines<'a, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let (measure, font, max_width) = (self.measure, self.font, self.max_width);
        loop {
            let words = match self.words.as_mut() {
                Some(words) => words,
                None => {
                    let paragraph = self.paragraphs.next()?;
                    let mut words = paragraph.split_whitespace();
                    match words.next() {
                        None => return Some(String::new()),
                        Some(first) => {
                            self.pending = Some(first);
                            self.words.insert(words)
                        }
                    }
                }
            };

            let first = match self.pending.take().or_else(|| words.next()) {
                Some(word) => word,
                None => {
                    self.words = None;
                    continue;
                }
            };

            let mut line = first.to_string();
            for word in words.by_ref() {
                let candidate = format!("{line} {word}");
                if measure.measure_text(&candidate, font) <= max_width + FIT_EPSILON {
                    line = candidate;
                } else {
                    self.pending = Some(word);
                    break;
                }
            }
            return Some(line);
        }
    }
}

/// Height of `line_count` lines set in `style`.
pub fn text_height(line_count: usize, style: &TextStyle) -> f64 {
    line_count as f64 * style.line_height()
}

/// Baseline of a line whose line box starts at `line_top`. The leading is
/// split evenly above and below the glyphs.
pub(crate) fn baseline(line_top: f64, style: &TextStyle) -> f64 {
    let half_leading = (style.line_height() - style.font_size) / 2.0;
    line_top - half_leading - ASCENT * style.font_size
}

/// Wraps and places text of one style within one width.
#[derive(Debug, Clone)]
pub struct TextFlow<'s> {
    style: &'s TextStyle,
    font: FontSpec,
    align: HAlign,
    max_width: f64,
}

impl<'s> TextFlow<'s> {
    pub fn new(style: &'s TextStyle, max_width: f64) -> Self {
        Self {
            style,
            font: style.font(),
            align: style.align,
            max_width,
        }
    }

    /// Override the horizontal alignment of the style.
    pub fn with_align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn lines<'a, M: TextMeasure + ?Sized>(
        &'a self,
        text: &'a str,
        measure: &'a M,
    ) -> WrappedLines<'a, M> {
        wrap(text, self.max_width, &self.font, measure)
    }

    /// Height the wrapped text needs.
    pub fn height<M: TextMeasure + ?Sized>(&self, text: &str, measure: &M) -> f64 {
        text_height(self.lines(text, measure).count(), self.style)
    }

    /// Draw `text` inside `rect` and return the height of the lines drawn.
    ///
    /// Lines that do not fit the box height are dropped. The block of drawn
    /// lines is positioned inside the box by the style's vertical alignment,
    /// and every line by the horizontal alignment.
    pub fn draw_box<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        rect: Rect,
    ) -> std::result::Result<f64, CanvasError> {
        let lines: Vec<String> = self.lines(text, &*canvas).collect();
        let line_height = self.style.line_height();
        let capacity = ((rect.height + FIT_EPSILON) / line_height).floor().max(0.0) as usize;
        let shown = lines.len().min(capacity);
        let used = text_height(shown, self.style);

        let offset = match self.style.v_align {
            VAlign::Top => 0.0,
            VAlign::Middle => (rect.height - used) / 2.0,
            VAlign::Bottom => rect.height - used,
        };
        let top = rect.top() - offset;
        self.draw_lines(canvas, &lines[..shown], rect.x, rect.width, top)?;
        Ok(used)
    }

    /// Draw lines downward from `top`, each aligned within `width`.
    fn draw_lines<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        lines: &[String],
        x: f64,
        width: f64,
        top: f64,
    ) -> std::result::Result<(), CanvasError> {
        let line_height = self.style.line_height();
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = canvas.measure_text(line, &self.font);
            let line_x = x + self.align.offset(width, line_width);
            let y = baseline(top - i as f64 * line_height, self.style);
            canvas.draw_text(line_x, y, line, &self.font, self.style.color)?;
        }
        Ok(())
    }
}

impl<C: Canvas + ?Sized> Paginator<'_, C> {
    /// Write a paragraph across the usable width at the cursor.
    ///
    /// A paragraph that fits on one page is kept together, breaking first if
    /// needed. A taller one flows line by line across pages. Returns the
    /// height of the wrapped text.
    pub fn write_text(&mut self, text: &str, style: &TextStyle) -> Result<f64> {
        self.ensure_active("write_text")?;
        style.validate()?;
        let flow = TextFlow::new(style, self.geometry().usable_width());
        let lines: Vec<String> = flow.lines(text, self.canvas()).collect();
        if lines.is_empty() {
            return Ok(0.0);
        }

        let line_height = style.line_height();
        let total = text_height(lines.len(), style);
        if total <= self.geometry().usable_height() {
            self.check_space(total)?;
        }

        let x = self.geometry().start_x();
        let width = self.geometry().usable_width();
        for line in &lines {
            self.check_space(line_height)?;
            let top = self.cursor_y();
            self.draw("write_text", |canvas| {
                flow.draw_lines(canvas, std::slice::from_ref(line), x, width, top)
            })?;
            self.advance_y(line_height)?;
        }
        self.add_trailing_space(style.space_after)?;
        Ok(total)
    }

    /// Write text into a box at the left margin.
    ///
    /// `width` defaults to the usable width and `height` to the wrapped
    /// height of the text. Alignment inside the box follows the style. The
    /// box never spans pages. Returns the box height.
    pub fn write_text_box(
        &mut self,
        text: &str,
        width: Option<f64>,
        height: Option<f64>,
        style: &TextStyle,
    ) -> Result<f64> {
        self.ensure_active("write_text_box")?;
        style.validate()?;
        let usable = self.geometry().usable_width();
        let width = width.map_or(usable, |w| w.clamp(0.0, usable));
        let flow = TextFlow::new(style, width);
        let height = match height {
            Some(h) => h.max(0.0),
            None => flow.height(text, self.canvas()),
        };
        let height = self.fit_height(height);

        self.check_space(height)?;
        let rect = Rect::from_top(self.geometry().start_x(), self.cursor_y(), width, height);
        self.draw("write_text_box", |canvas| {
            flow.draw_box(canvas, text, rect).map(|_| ())
        })?;
        self.advance_y(height)?;
        self.add_trailing_space(style.space_after)?;
        Ok(height)
    }

    /// Write a heading that stays on the same page as the start of the
    /// content after it (at least two of its own lines' worth).
    pub fn write_heading(&mut self, text: &str, style: &TextStyle) -> Result<f64> {
        self.ensure_active("write_heading")?;
        style.validate()?;
        let flow = TextFlow::new(style, self.geometry().usable_width());
        let height = flow.height(text, self.canvas());
        self.keep_together(height + style.space_after + 2.0 * style.line_height())?;
        self.write_text(text, style)
    }
}
