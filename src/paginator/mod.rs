//! # Paginator
//!
//! Owns the vertical cursor and decides when a new page starts.
//!
//! The cursor lives in PDF user space: it starts at [`PageGeometry::start_y`]
//! on every page and moves down toward [`PageGeometry::min_y`] as content is
//! placed. Content whose height is known in advance is preceded by
//! [`Paginator::check_space`], which starts a new page when the request
//! would push the cursor below the bottom margin.
//!
//! A paginator is either active, with exactly one open page on its canvas,
//! or closed. [`Paginator::close`] releases the last page; dropping an
//! active paginator releases it too, so an error halfway through a report
//! never leaves a page open on the canvas.

use tracing::{debug, error, warn};

use crate::canvas::{Canvas, Rect};
use crate::error::{CanvasError, LayoutError, Result};
use crate::geometry::PageGeometry;
use crate::style::{FooterStyle, WatermarkStyle};
use crate::text::TextFlow;

/// Placeholder replaced with the 1-based page number in footer templates.
pub const PAGE_NUMBER_PLACEHOLDER: &str = "{{pageNumber}}";

/// Content drawn on every page as it is opened.
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    pub watermark: Option<WatermarkStyle>,
    pub footer: Option<FooterStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Closed,
}

pub struct Paginator<'c, C: Canvas + ?Sized> {
    geometry: PageGeometry,
    canvas: &'c mut C,
    cursor: f64,
    page_count: usize,
    state: State,
    decorations: Decorations,
}

impl<'c, C: Canvas + ?Sized> Paginator<'c, C> {
    /// Validate the geometry and open page 1 on `canvas`.
    pub fn new(geometry: PageGeometry, canvas: &'c mut C) -> Result<Self> {
        Self::with_decorations(geometry, canvas, Decorations::default())
    }

    pub fn with_decorations(
        geometry: PageGeometry,
        canvas: &'c mut C,
        decorations: Decorations,
    ) -> Result<Self> {
        geometry.validate()?;
        let mut paginator = Self {
            cursor: geometry.start_y(),
            geometry,
            canvas,
            page_count: 0,
            state: State::Active,
            decorations,
        };
        paginator.open_page()?;
        Ok(paginator)
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// 0-based index of the open page.
    pub fn current_page_index(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    /// Current vertical position of the cursor.
    pub fn cursor_y(&self) -> f64 {
        self.cursor
    }

    /// Space left between the cursor and the bottom margin.
    pub fn remaining_height(&self) -> f64 {
        (self.cursor - self.geometry.min_y()).max(0.0)
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    pub fn canvas(&self) -> &C {
        &*self.canvas
    }

    /// Finish the open page and start a new one.
    pub fn new_page(&mut self) -> Result<()> {
        self.ensure_active("new_page")?;
        self.release_page()?;
        self.open_page()
    }

    /// Start a new page if `required_height` does not fit below the cursor.
    /// Returns whether a break happened.
    ///
    /// Requests taller than a whole page are clipped to the usable height,
    /// so a break is followed by a request that always fits.
    pub fn check_space(&mut self, required_height: f64) -> Result<bool> {
        self.ensure_active("check_space")?;
        let required = self.fit_height(required_height);
        if self.has_space(required) {
            return Ok(false);
        }
        debug!(
            page = self.page_count,
            required,
            remaining = self.remaining_height(),
            "page break"
        );
        self.new_page()?;
        Ok(true)
    }

    /// Whether `required_height` fits below the cursor. Never mutates.
    pub fn has_space(&self, required_height: f64) -> bool {
        self.cursor - required_height >= self.geometry.min_y()
    }

    /// Move the cursor down by `amount`. The cursor never passes the bottom
    /// margin.
    pub fn advance_y(&mut self, amount: f64) -> Result<()> {
        self.ensure_active("advance_y")?;
        self.cursor = (self.cursor - amount.max(0.0)).max(self.geometry.min_y());
        Ok(())
    }

    /// Insert blank vertical space, breaking the page first if the space
    /// itself does not fit. Returns whether a break happened.
    pub fn add_space(&mut self, amount: f64) -> Result<bool> {
        let amount = self.fit_height(amount);
        let broke = self.check_space(amount)?;
        self.advance_y(amount)?;
        Ok(broke)
    }

    /// Space after a block. Stops at the bottom margin instead of opening a
    /// page that would otherwise stay empty.
    pub(crate) fn add_trailing_space(&mut self, amount: f64) -> Result<()> {
        let amount = amount.max(0.0).min(self.remaining_height());
        self.advance_y(amount)
    }

    /// Break pre-emptively when `height` does not fit here but would fit on
    /// a fresh page. Content taller than a page is left to flow.
    pub fn keep_together(&mut self, height: f64) -> Result<bool> {
        self.ensure_active("keep_together")?;
        if self.has_space(height) || height > self.geometry.usable_height() {
            return Ok(false);
        }
        debug!(page = self.page_count, height, "keeping block together");
        self.new_page()?;
        Ok(true)
    }

    /// Clip a space request to what one page can hold.
    pub fn fit_height(&self, required_height: f64) -> f64 {
        let usable = self.geometry.usable_height();
        if required_height > usable {
            warn!(
                page = self.page_count,
                requested = required_height,
                usable,
                "content taller than a page; clipping"
            );
            usable
        } else {
            required_height.max(0.0)
        }
    }

    /// Finish the last page. Calling `close` again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closed;
        self.release_page()
    }

    /// Run one drawing call against the open page, attaching the page and
    /// operation to any failure.
    pub(crate) fn draw<F>(&mut self, operation: &'static str, f: F) -> Result<()>
    where
        F: FnOnce(&mut C) -> std::result::Result<(), CanvasError>,
    {
        self.ensure_active(operation)?;
        f(&mut *self.canvas).map_err(|source| self.failure(operation, source))
    }

    pub(crate) fn failure(&self, operation: &'static str, source: CanvasError) -> LayoutError {
        LayoutError::Failed {
            page: self.page_count,
            operation,
            source,
        }
    }

    pub(crate) fn ensure_active(&self, operation: &'static str) -> Result<()> {
        match self.state {
            State::Active => Ok(()),
            State::Closed => Err(LayoutError::Closed { operation }),
        }
    }

    fn release_page(&mut self) -> Result<()> {
        self.canvas
            .end_page()
            .map_err(|source| LayoutError::Release {
                page: self.page_count,
                source,
            })
    }

    fn open_page(&mut self) -> Result<()> {
        let (width, height) = self.geometry.effective_size();
        self.page_count += 1;
        self.cursor = self.geometry.start_y();
        self.canvas
            .begin_page(width, height)
            .map_err(|source| self.failure("new_page", source))?;
        self.decorate_page()
    }

    /// The watermark goes first so content paints over it.
    fn decorate_page(&mut self) -> Result<()> {
        if let Some(watermark) = self.decorations.watermark.clone() {
            if !watermark.text.is_empty() {
                self.draw_watermark(&watermark)?;
            }
        }
        if let Some(footer) = self.decorations.footer.clone() {
            self.draw_footer(&footer)?;
        }
        Ok(())
    }

    fn draw_watermark(&mut self, watermark: &WatermarkStyle) -> Result<()> {
        let font = watermark.font();
        let (width, height) = self.geometry.effective_size();
        let text_width = self.canvas.measure_text(&watermark.text, &font);
        let (sin, cos) = watermark.angle.to_radians().sin_cos();
        // Shift the baseline origin so the middle of the run sits on the page center.
        let half_w = text_width / 2.0;
        let half_cap = font.size * 0.35;
        let x = width / 2.0 - cos * half_w + sin * half_cap;
        let y = height / 2.0 - sin * half_w - cos * half_cap;
        self.draw("watermark", |canvas| {
            canvas.draw_text_rotated(x, y, watermark.angle, &watermark.text, &font, watermark.color)
        })
    }

    fn draw_footer(&mut self, footer: &FooterStyle) -> Result<()> {
        let text = footer
            .template
            .replace(PAGE_NUMBER_PLACEHOLDER, &self.page_count.to_string());
        let line_height = footer.style.line_height();
        let margin = self.geometry.min_y();
        let top = (margin + line_height) / 2.0;
        let rect = Rect::from_top(
            self.geometry.start_x(),
            top,
            self.geometry.usable_width(),
            line_height,
        );
        let flow = TextFlow::new(&footer.style, rect.width);
        self.draw("footer", |canvas| flow.draw_box(canvas, &text, rect).map(|_| ()))
    }
}

impl<C: Canvas + ?Sized> Drop for Paginator<'_, C> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "failed to release page on drop");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::canvas::{DrawOp, Point, RecordingCanvas, Stroke};
    use crate::font::{FontSpec, TextMeasure};
    use crate::geometry::{Edges, Orientation, PageSize};
    use crate::image_loader::LoadedImage;
    use crate::style::Color;

    type CanvasResult = std::result::Result<(), CanvasError>;

    /// Records like [`RecordingCanvas`] but refuses to finish any page.
    #[derive(Default)]
    pub(crate) struct StuckCanvas {
        pub(crate) inner: RecordingCanvas,
        pub(crate) release_attempts: usize,
    }

    impl TextMeasure for StuckCanvas {
        fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
            self.inner.measure_text(text, font)
        }
    }

    impl Canvas for StuckCanvas {
        fn begin_page(&mut self, width: f64, height: f64) -> CanvasResult {
            self.inner.begin_page(width, height)
        }

        fn end_page(&mut self) -> CanvasResult {
            self.release_attempts += 1;
            Err(CanvasError::NoOpenPage)
        }

        fn draw_text(
            &mut self,
            x: f64,
            y: f64,
            text: &str,
            font: &FontSpec,
            color: Color,
        ) -> CanvasResult {
            self.inner.draw_text(x, y, text, font, color)
        }

        fn draw_text_rotated(
            &mut self,
            x: f64,
            y: f64,
            angle: f64,
            text: &str,
            font: &FontSpec,
            color: Color,
        ) -> CanvasResult {
            self.inner.draw_text_rotated(x, y, angle, text, font, color)
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) -> CanvasResult {
            self.inner.fill_rect(rect, color)
        }

        fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) -> CanvasResult {
            self.inner.stroke_rect(rect, stroke)
        }

        fn stroke_line(
            &mut self,
            from: Point,
            to: Point,
            stroke: &Stroke,
        ) -> CanvasResult {
            self.inner.stroke_line(from, to, stroke)
        }

        fn draw_image(&mut self, image: &LoadedImage, rect: Rect) -> CanvasResult {
            self.inner.draw_image(image, rect)
        }
    }

    fn letter() -> PageGeometry {
        PageGeometry::new(PageSize::Letter, Orientation::Portrait, Edges::uniform(50.0)).unwrap()
    }

    #[test]
    fn starts_on_page_one_at_start_y() {
        let mut canvas = RecordingCanvas::new();
        let p = Paginator::new(letter(), &mut canvas).unwrap();
        assert_eq!(p.page_count(), 1);
        assert_eq!(p.current_page_index(), 0);
        assert!((p.cursor_y() - 742.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let bad = PageGeometry::new(
            PageSize::Custom {
                width: 100.0,
                height: 100.0,
            },
            Orientation::Portrait,
            Edges::uniform(50.0),
        );
        assert!(matches!(bad, Err(LayoutError::DegeneratePage { .. })));
    }

    #[test]
    fn check_space_twice_breaks_at_most_once() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.advance_y(600.0).unwrap();
        assert!(p.check_space(100.0).unwrap());
        assert!(!p.check_space(100.0).unwrap());
        assert_eq!(p.page_count(), 2);
    }

    #[test]
    fn add_space_that_fits_moves_cursor_exactly() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.advance_y(100.0).unwrap();
        assert!(p.has_space(30.0));
        assert!(!p.add_space(30.0).unwrap());
        assert!((p.cursor_y() - 612.0).abs() < 1e-9);
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn add_space_that_overflows_breaks_once_and_consumes() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.advance_y(650.0).unwrap();
        assert!(p.add_space(60.0).unwrap());
        assert_eq!(p.page_count(), 2);
        assert!((p.cursor_y() - (742.0 - 60.0)).abs() < 1e-9);
    }

    #[test]
    fn exact_fit_does_not_break() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        assert!(!p.check_space(692.0).unwrap());
        p.advance_y(692.0).unwrap();
        assert!((p.cursor_y() - 50.0).abs() < 1e-9);
        assert!(p.check_space(0.5).unwrap());
    }

    #[test]
    fn oversize_request_is_clipped_not_looped() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.advance_y(10.0).unwrap();
        assert!(p.add_space(5000.0).unwrap());
        assert_eq!(p.page_count(), 2);
        assert!((p.cursor_y() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn keep_together_breaks_only_when_a_fresh_page_helps() {
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.advance_y(500.0).unwrap();
        assert!(!p.keep_together(1000.0).unwrap());
        assert!(p.keep_together(300.0).unwrap());
        assert_eq!(p.page_count(), 2);
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            p.new_page().unwrap();
            p.close().unwrap();
            p.close().unwrap();
            assert!(p.is_closed());
            assert!(matches!(
                p.check_space(10.0),
                Err(LayoutError::Closed {
                    operation: "check_space"
                })
            ));
            assert!(matches!(p.new_page(), Err(LayoutError::Closed { .. })));
        }
        assert_eq!(canvas.pages().len(), 2);
        assert!(canvas.pages().iter().all(|page| page.closed));
    }

    #[test]
    fn drop_releases_the_open_page() {
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            p.advance_y(10.0).unwrap();
        }
        assert!(canvas.pages()[0].closed);
    }

    #[test]
    fn landscape_pages_use_swapped_size() {
        let geometry =
            PageGeometry::new(PageSize::Letter, Orientation::Landscape, Edges::uniform(50.0))
                .unwrap();
        let mut canvas = RecordingCanvas::new();
        drop(Paginator::new(geometry, &mut canvas).unwrap());
        let page = &canvas.pages()[0];
        assert_eq!((page.width, page.height), (792.0, 612.0));
    }

    #[test]
    fn decorations_are_drawn_on_every_page() {
        let decorations = Decorations {
            watermark: Some(WatermarkStyle::draft()),
            footer: Some(FooterStyle::default()),
        };
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::with_decorations(letter(), &mut canvas, decorations).unwrap();
            p.new_page().unwrap();
            p.close().unwrap();
        }
        for (i, page) in canvas.pages().iter().enumerate() {
            assert!(matches!(
                page.ops.first(),
                Some(DrawOp::RotatedText { text, .. }) if text == "DRAFT"
            ));
            let expected = format!("Page {} of {{{{totalPages}}}}", i + 1);
            assert_eq!(page.texts(), vec![expected.as_str()]);
        }
    }

    #[test]
    fn release_failure_is_fatal() {
        let mut canvas = StuckCanvas::default();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            match p.new_page() {
                Err(LayoutError::Release { page, .. }) => assert_eq!(page, 1),
                other => panic!("expected release failure, got {other:?}"),
            }
            assert_eq!(p.page_count(), 1);
            assert!(matches!(p.close(), Err(LayoutError::Release { page: 1, .. })));
            assert!(p.close().is_ok());
        }
        // new_page and the first close tried; the second close and drop did not.
        assert_eq!(canvas.release_attempts, 2);
        assert_eq!(canvas.inner.pages().len(), 1);
    }
}
