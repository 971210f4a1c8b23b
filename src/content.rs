//! Images, QR barcodes and horizontal rules placed at the cursor.

use qrcode::{EcLevel, QrCode};
use tracing::warn;

use crate::canvas::{Canvas, Point, Rect, Stroke};
use crate::error::{CanvasError, Result};
use crate::image_loader::{load_image, LoadedImage};
use crate::paginator::Paginator;
use crate::style::{BarcodeStyle, ErrorCorrection, HAlign, ImageStyle, LineStyle};
use crate::text::TextFlow;

/// Points per image pixel when no display size is given (96 DPI).
const POINTS_PER_PIXEL: f64 = 0.75;

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

/// Display size of `image` in points before fitting to the page.
fn natural_size(image: &LoadedImage, style: &ImageStyle) -> (f64, f64) {
    let aspect = image.aspect_ratio();
    match (style.width, style.height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * aspect),
        (None, Some(h)) if aspect > 0.0 => (h / aspect, h),
        _ => {
            let w = image.width_px as f64 * POINTS_PER_PIXEL;
            (w, w * aspect)
        }
    }
}

impl<C: Canvas + ?Sized> Paginator<'_, C> {
    /// Load an image and place it at the cursor, scaled down to fit the
    /// usable area with its aspect ratio kept. Returns the drawn height.
    pub fn insert_image(&mut self, src: &str, style: &ImageStyle) -> Result<f64> {
        self.ensure_active("insert_image")?;
        let image = load_image(src).map_err(|e| self.failure("insert_image", e))?;
        self.place_image(&image, style)
    }

    /// Place an already decoded image. See [`Paginator::insert_image`].
    pub fn place_image(&mut self, image: &LoadedImage, style: &ImageStyle) -> Result<f64> {
        self.ensure_active("insert_image")?;
        let (mut width, mut height) = natural_size(image, style);
        let max_width = self.geometry().usable_width();
        let max_height = self.geometry().usable_height();
        let scale = (max_width / width).min(max_height / height).min(1.0);
        if scale < 1.0 {
            warn!(width, height, scale, "image larger than the page; scaling down");
            width *= scale;
            height *= scale;
        }

        self.check_space(height)?;
        let x = self.geometry().start_x() + style.align.offset(max_width, width);
        let rect = Rect::from_top(x, self.cursor_y(), width, height);
        self.draw("insert_image", |canvas| canvas.draw_image(image, rect))?;
        self.advance_y(height)?;
        self.add_trailing_space(style.space_after)?;
        Ok(height)
    }

    /// Encode `data` as a QR symbol and draw it at the cursor. Returns the
    /// height of the symbol plus its caption.
    pub fn insert_barcode(&mut self, data: &str, style: &BarcodeStyle) -> Result<f64> {
        self.ensure_active("insert_barcode")?;
        style.caption_style.validate()?;
        let code = QrCode::with_error_correction_level(data.as_bytes(), style.error_correction.into())
            .map_err(|e| self.failure("insert_barcode", CanvasError::Barcode(e.to_string())))?;

        let usable_height = self.geometry().usable_height();
        let caption_height = if style.caption {
            style.caption_style.line_height().min(usable_height)
        } else {
            0.0
        };
        let max_size = self
            .geometry()
            .usable_width()
            .min(usable_height - caption_height);
        let size = if style.size > max_size {
            warn!(size = style.size, max_size, "barcode larger than the page; shrinking");
            max_size
        } else {
            style.size.max(0.0)
        };
        let height = self.fit_height(size + caption_height);

        self.check_space(height)?;
        let x = self.geometry().start_x() + style.align.offset(self.geometry().usable_width(), size);
        let top = self.cursor_y();
        let modules = code.width();
        let colors = code.to_colors();
        self.draw("insert_barcode", |canvas| {
            draw_symbol(canvas, &colors, modules, x, top, size, style)?;
            if style.caption {
                let caption = Rect::from_top(x, top - size, size, caption_height);
                TextFlow::new(&style.caption_style, size)
                    .with_align(HAlign::Center)
                    .draw_box(canvas, data, caption)?;
            }
            Ok(())
        })?;
        self.advance_y(height)?;
        self.add_trailing_space(style.space_after)?;
        Ok(height)
    }

    /// Draw a horizontal rule across the usable width. Returns the vertical
    /// space used, spacing included.
    pub fn draw_line(&mut self, style: &LineStyle) -> Result<f64> {
        self.ensure_active("draw_line")?;
        let thickness = style.thickness.max(0.0);
        let before = style.space_before.max(0.0);
        self.check_space(before + thickness)?;
        self.advance_y(before)?;

        let y = self.cursor_y() - thickness / 2.0;
        let from = Point::new(self.geometry().start_x(), y);
        let to = Point::new(self.geometry().end_x(), y);
        let stroke = Stroke {
            width: thickness,
            color: style.color,
            dash: style.border.dash_pattern(),
        };
        if style.border.is_visible() && thickness > 0.0 {
            self.draw("draw_line", |canvas| canvas.stroke_line(from, to, &stroke))?;
        }
        self.advance_y(thickness)?;
        self.add_trailing_space(style.space_after)?;
        Ok(before + thickness + style.space_after.max(0.0))
    }
}

/// Fill the dark modules of a QR symbol, one rectangle per horizontal run.
fn draw_symbol<C: Canvas + ?Sized>(
    canvas: &mut C,
    colors: &[qrcode::Color],
    modules: usize,
    x: f64,
    top: f64,
    size: f64,
    style: &BarcodeStyle,
) -> std::result::Result<(), CanvasError> {
    if let Some(background) = style.background {
        canvas.fill_rect(Rect::from_top(x, top, size, size), background)?;
    }
    let quiet = style.quiet_zone as usize;
    let module = size / (modules + 2 * quiet) as f64;
    for (row, cells) in colors.chunks(modules).enumerate() {
        let mut col = 0;
        while col < cells.len() {
            if cells[col] != qrcode::Color::Dark {
                col += 1;
                continue;
            }
            let start = col;
            while col < cells.len() && cells[col] == qrcode::Color::Dark {
                col += 1;
            }
            let rect = Rect::from_top(
                x + (quiet + start) as f64 * module,
                top - (quiet + row) as f64 * module,
                (col - start) as f64 * module,
                module,
            );
            canvas.fill_rect(rect, style.color)?;
        }
    }
    Ok(())
}
