//! # Table Layout
//!
//! Column widths, row heights and page-aware drawing of tables.
//!
//! Column widths are computed once per table and stay the same on every
//! page. Rows are laid out top to bottom; when a body row does not fit
//! below the cursor the paginator breaks the page and the header row is
//! drawn again at the top of the new page before the row itself.
//!
//! A body row taller than a page minus the header can never fit and is
//! clipped to that height.

use tracing::{debug, warn};

use crate::canvas::{Canvas, Rect, Stroke};
use crate::error::{CanvasError, LayoutError, Result};
use crate::font::TextMeasure;
use crate::paginator::Paginator;
use crate::style::{Color, RowHeight, TableStyle, TextStyle};
use crate::text::TextFlow;

/// Validated tabular input: one header row and any number of body rows, all
/// with the same number of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    column_ratios: Option<Vec<f64>>,
}

impl TableData {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if header.is_empty() {
            return Err(LayoutError::MalformedTable(
                "table must have at least one column".to_string(),
            ));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != header.len())
        {
            return Err(LayoutError::MalformedTable(format!(
                "row {} has {} cells, expected {}",
                i + 1,
                row.len(),
                header.len()
            )));
        }
        Ok(Self {
            header,
            rows,
            column_ratios: None,
        })
    }

    /// Build from rows where row 0 is the header.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(LayoutError::MalformedTable("table has no rows".to_string()));
        }
        let header = rows.remove(0);
        Self::new(header, rows)
    }

    /// Proportional column widths. Must have one non-negative entry per
    /// column with a positive sum.
    pub fn with_column_ratios(mut self, ratios: Vec<f64>) -> Result<Self> {
        validate_ratios(self.column_count(), &ratios)?;
        self.column_ratios = Some(ratios);
        Ok(self)
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_ratios(&self) -> Option<&[f64]> {
        self.column_ratios.as_deref()
    }
}

fn validate_ratios(num_columns: usize, ratios: &[f64]) -> Result<()> {
    if ratios.len() != num_columns {
        return Err(LayoutError::MalformedTable(format!(
            "{} column ratios given for {} columns",
            ratios.len(),
            num_columns
        )));
    }
    if let Some(bad) = ratios.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(LayoutError::MalformedTable(format!(
            "column ratio {bad} is not a non-negative number"
        )));
    }
    if !(ratios.iter().sum::<f64>() > 0.0) {
        return Err(LayoutError::MalformedTable(
            "column ratios sum to zero".to_string(),
        ));
    }
    Ok(())
}

/// Split `total_width` into `num_columns` widths, uniformly or in proportion
/// to `ratios`.
pub fn compute_column_widths(
    total_width: f64,
    num_columns: usize,
    ratios: Option<&[f64]>,
) -> Result<Vec<f64>> {
    if num_columns == 0 {
        return Err(LayoutError::MalformedTable(
            "table must have at least one column".to_string(),
        ));
    }
    match ratios {
        None => Ok(vec![total_width / num_columns as f64; num_columns]),
        Some(ratios) => {
            validate_ratios(num_columns, ratios)?;
            let sum: f64 = ratios.iter().sum();
            Ok(ratios.iter().map(|r| r / sum * total_width).collect())
        }
    }
}

/// Height of one row: the fixed height, or the tallest wrapped cell plus
/// padding. Never less than one line plus padding.
pub fn row_height<M: TextMeasure + ?Sized>(
    cells: &[String],
    widths: &[f64],
    text: &TextStyle,
    style: &TableStyle,
    measure: &M,
) -> f64 {
    let padding = style.cell_padding;
    let minimum = 2.0 * padding + text.line_height();
    match style.row_height {
        RowHeight::Fixed(h) => h.max(minimum),
        RowHeight::Auto => cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                TextFlow::new(text, width - 2.0 * padding).height(cell, measure) + 2.0 * padding
            })
            .fold(minimum, f64::max),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    /// 0-based index among body rows.
    Body(usize),
}

/// Per-table values that stay fixed while rows are drawn.
struct TableLayout<'a> {
    data: &'a TableData,
    style: &'a TableStyle,
    x: f64,
    widths: Vec<f64>,
}

impl TableLayout<'_> {
    fn text_style(&self, kind: RowKind) -> &TextStyle {
        match kind {
            RowKind::Header => &self.style.header,
            RowKind::Body(_) => &self.style.body,
        }
    }

    fn cells(&self, kind: RowKind) -> &[String] {
        match kind {
            RowKind::Header => &self.data.header,
            RowKind::Body(i) => &self.data.rows[i],
        }
    }

    fn background(&self, kind: RowKind) -> Option<Color> {
        match kind {
            RowKind::Header => self.style.header_background,
            RowKind::Body(i) if i % 2 == 1 => self
                .style
                .alternate_row_background
                .or(self.style.row_background),
            RowKind::Body(_) => self.style.row_background,
        }
    }

    fn border(&self) -> Option<Stroke> {
        let style = self.style;
        (style.border.is_visible() && style.border_width > 0.0).then(|| Stroke {
            width: style.border_width,
            color: style.border_color,
            dash: style.border.dash_pattern(),
        })
    }

    fn measure_row<M: TextMeasure + ?Sized>(&self, kind: RowKind, measure: &M) -> f64 {
        row_height(
            self.cells(kind),
            &self.widths,
            self.text_style(kind),
            self.style,
            measure,
        )
    }

    /// Draw one row with its top edge at `top`.
    fn draw_row<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        kind: RowKind,
        top: f64,
        height: f64,
    ) -> std::result::Result<(), CanvasError> {
        let total_width: f64 = self.widths.iter().sum();
        if let Some(color) = self.background(kind) {
            canvas.fill_rect(Rect::from_top(self.x, top, total_width, height), color)?;
        }

        let text = self.text_style(kind);
        let padding = self.style.cell_padding;
        let border = self.border();
        let mut x = self.x;
        for (col, (cell, &width)) in self.cells(kind).iter().zip(&self.widths).enumerate() {
            let align = self.style.column_align.get(col).copied().unwrap_or(text.align);
            let inner = Rect::from_top(
                x + padding,
                top - padding,
                (width - 2.0 * padding).max(0.0),
                (height - 2.0 * padding).max(0.0),
            );
            TextFlow::new(text, inner.width)
                .with_align(align)
                .draw_box(canvas, cell, inner)?;
            if let Some(stroke) = &border {
                canvas.stroke_rect(Rect::from_top(x, top, width, height), stroke)?;
            }
            x += width;
        }
        Ok(())
    }
}

impl<C: Canvas + ?Sized> Paginator<'_, C> {
    /// Draw a table at the cursor and return the sum of the header and body
    /// row heights. Headers repeated on continuation pages are not counted.
    pub fn create_table(&mut self, data: &TableData, style: &TableStyle) -> Result<f64> {
        self.ensure_active("create_table")?;
        style.validate()?;

        let usable = self.geometry().usable_width();
        let total_width = match style.width {
            Some(w) if w > usable => {
                warn!(requested = w, usable, "table wider than the page; narrowing");
                usable
            }
            Some(w) => w,
            None => usable,
        };
        let layout = TableLayout {
            data,
            style,
            x: self.geometry().start_x(),
            widths: compute_column_widths(total_width, data.column_count(), data.column_ratios())?,
        };

        let usable_height = self.geometry().usable_height();
        let mut header_height = self.fit_height(layout.measure_row(RowKind::Header, self.canvas()));
        let row_floor = 2.0 * style.cell_padding + style.body.line_height();
        if !data.rows().is_empty() && header_height + row_floor > usable_height {
            let limit = (usable_height - row_floor).max(0.0);
            warn!(height = header_height, limit, "table header leaves no room for a row; clipping");
            header_height = limit;
        }

        // Body rows are clipped so a row and the repeated header share a page.
        let body_limit = usable_height - header_height;
        let mut heights = Vec::with_capacity(data.rows().len());
        for i in 0..data.rows().len() {
            let height = layout.measure_row(RowKind::Body(i), self.canvas());
            if height > body_limit {
                warn!(
                    row = i + 1,
                    height,
                    limit = body_limit,
                    "table row taller than a page; clipping"
                );
            }
            heights.push(height.min(body_limit));
        }

        if let Some(first) = heights.first() {
            self.keep_together(header_height + first)?;
        }
        self.place_row(&layout, RowKind::Header, header_height)?;
        let mut total = header_height;

        for (i, &height) in heights.iter().enumerate() {
            if self.check_space(height)? {
                debug!(page = self.page_count(), row = i + 1, "repeating table header");
                self.place_row(&layout, RowKind::Header, header_height)?;
            }
            self.place_row(&layout, RowKind::Body(i), height)?;
            total += height;
        }

        self.add_trailing_space(style.space_after)?;
        Ok(total)
    }

    fn place_row(&mut self, layout: &TableLayout<'_>, kind: RowKind, height: f64) -> Result<()> {
        if kind == RowKind::Header {
            self.check_space(height)?;
        }
        let top = self.cursor_y();
        self.draw("create_table", |canvas| {
            layout.draw_row(canvas, kind, top, height)
        })?;
        self.advance_y(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::font::FontContext;
    use crate::geometry::{Edges, Orientation, PageGeometry, PageSize};
    use crate::style::BorderStyle;

    fn letter() -> PageGeometry {
        PageGeometry::new(PageSize::Letter, Orientation::Portrait, Edges::uniform(50.0)).unwrap()
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn numbered_rows(count: usize) -> Vec<Vec<String>> {
        (1..=count)
            .map(|i| vec![format!("A{i}"), format!("Asset {i}"), format!("{i}")])
            .collect()
    }

    #[test]
    fn ratio_widths() {
        let widths = compute_column_widths(512.0, 3, Some(&[1.0, 2.0, 1.0])).unwrap();
        assert_eq!(widths, vec![128.0, 256.0, 128.0]);
    }

    #[test]
    fn uniform_widths() {
        let widths = compute_column_widths(512.0, 4, None).unwrap();
        assert!(widths.iter().all(|w| (w - 128.0).abs() < 1e-9));
    }

    #[test]
    fn widths_sum_to_total() {
        let ratio_sets: [&[f64]; 4] = [
            &[1.0],
            &[0.3, 0.3, 0.4],
            &[7.0, 0.0, 13.5, 2.25],
            &[1e-3, 5.0, 1e3],
        ];
        for ratios in ratio_sets {
            let widths = compute_column_widths(487.3, ratios.len(), Some(ratios)).unwrap();
            let sum: f64 = widths.iter().sum();
            assert!((sum - 487.3).abs() < 1e-9);
            assert!(widths.iter().all(|w| *w >= 0.0));
        }
    }

    #[test]
    fn bad_ratios_are_rejected() {
        assert!(matches!(
            compute_column_widths(100.0, 3, Some(&[1.0, 2.0])),
            Err(LayoutError::MalformedTable(_))
        ));
        assert!(compute_column_widths(100.0, 2, Some(&[1.0, -1.0])).is_err());
        assert!(compute_column_widths(100.0, 2, Some(&[0.0, 0.0])).is_err());
        assert!(compute_column_widths(100.0, 1, Some(&[f64::NAN])).is_err());
        assert!(compute_column_widths(100.0, 0, None).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TableData::new(strings(&["a", "b"]), vec![strings(&["1"])]).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 cells"));
        assert!(TableData::from_rows(Vec::new()).is_err());
        assert!(TableData::new(Vec::new(), Vec::new()).is_err());
        assert!(TableData::new(strings(&["a"]), Vec::new())
            .unwrap()
            .with_column_ratios(vec![1.0, 1.0])
            .is_err());
    }

    #[test]
    fn row_height_has_a_floor() {
        let fonts = FontContext::new();
        let style = TableStyle::default().with_row_height(RowHeight::Fixed(5.0));
        let h = row_height(&strings(&[""]), &[100.0], &style.body, &style, &fonts);
        assert!((h - (8.0 + 12.0)).abs() < 1e-9);

        let auto = TableStyle::default();
        let h = row_height(&strings(&["", ""]), &[100.0, 100.0], &auto.body, &auto, &fonts);
        assert!((h - 20.0).abs() < 1e-9);
    }

    #[test]
    fn auto_row_height_follows_tallest_cell() {
        let fonts = FontContext::new();
        let style = TableStyle::default();
        let cells = strings(&["short", "this cell wraps onto several lines of text"]);
        let h = row_height(&cells, &[200.0, 60.0], &style.body, &style, &fonts);
        let lines = TextFlow::new(&style.body, 52.0).lines(&cells[1], &fonts).count();
        assert!(lines > 1);
        assert!((h - (lines as f64 * 12.0 + 8.0)).abs() < 1e-9);
    }

    #[test]
    fn header_repeats_after_page_break() {
        let rows = numbered_rows(29);
        let data = TableData::new(strings(&["Tag", "Name", "Qty"]), rows)
            .unwrap()
            .with_column_ratios(vec![1.0, 2.0, 1.0])
            .unwrap();
        let style = TableStyle::default()
            .with_row_height(RowHeight::Fixed(25.0))
            .with_space_after(0.0);

        let mut canvas = RecordingCanvas::new();
        let total = {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            let total = p.create_table(&data, &style).unwrap();
            assert_eq!(p.page_count(), 2);
            total
        };
        assert!((total - 750.0).abs() < 1e-9);

        let pages = canvas.pages();
        let first = pages[0].texts();
        let second = pages[1].texts();
        // header + 26 body rows on page 1
        assert_eq!(first.len(), 27 * 3);
        assert_eq!(&first[..3], &["Tag", "Name", "Qty"]);
        assert_eq!(&first[first.len() - 3..], &["A26", "Asset 26", "26"]);
        assert_eq!(&second[..3], &["Tag", "Name", "Qty"]);
        assert_eq!(&second[3..6], &["A27", "Asset 27", "27"]);
        assert_eq!(second.len(), 4 * 3);

        // repeated header is styled identically
        let header_fill = |page: &crate::canvas::RecordedPage| page.fills()[0];
        let (rect1, color1) = header_fill(&pages[0]);
        let (rect2, color2) = header_fill(&pages[1]);
        assert_eq!(color1, color2);
        assert_eq!(rect1, rect2);
        assert_eq!(rect1.width, 512.0);
    }

    #[test]
    fn alternating_fills() {
        let rows = vec![strings(&["1"]), strings(&["2"]), strings(&["3"])];
        let data = TableData::new(strings(&["h"]), rows).unwrap();
        let style = TableStyle::default()
            .with_row_backgrounds(Some(Color::WHITE), Some(Color::LIGHT_GRAY));
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            p.create_table(&data, &style).unwrap();
        }
        let colors: Vec<Color> = canvas.pages()[0].fills().iter().map(|(_, c)| *c).collect();
        assert_eq!(
            colors[1..],
            [Color::WHITE, Color::LIGHT_GRAY, Color::WHITE]
        );
    }

    #[test]
    fn borders_follow_style() {
        let data = TableData::new(strings(&["a", "b"]), vec![strings(&["1", "2"])]).unwrap();
        let dashed = TableStyle::default().with_border(BorderStyle::Dashed, Color::BLACK, 1.0);
        let none = TableStyle::default().with_border(BorderStyle::None, Color::BLACK, 1.0);

        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            p.create_table(&data, &dashed).unwrap();
            p.new_page().unwrap();
            p.create_table(&data, &none).unwrap();
        }
        let strokes = |i: usize| -> Vec<Stroke> {
            canvas.pages()[i]
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::StrokeRect { stroke, .. } => Some(*stroke),
                    _ => None,
                })
                .collect()
        };
        let first = strokes(0);
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|s| s.dash == BorderStyle::Dashed.dash_pattern()));
        assert!(strokes(1).is_empty());
    }

    #[test]
    fn oversized_row_is_clipped_below_header() {
        let long = vec!["word"; 2000].join(" ");
        let data = TableData::new(strings(&["h"]), vec![vec![long]]).unwrap();
        let style = TableStyle::default().with_space_after(0.0);
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        let total = p.create_table(&data, &style).unwrap();
        assert!((total - 692.0).abs() < 1e-9);
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn closed_paginator_rejects_tables() {
        let data = TableData::new(strings(&["a"]), Vec::new()).unwrap();
        let mut canvas = RecordingCanvas::new();
        let mut p = Paginator::new(letter(), &mut canvas).unwrap();
        p.close().unwrap();
        assert!(matches!(
            p.create_table(&data, &TableStyle::default()),
            Err(LayoutError::Closed { .. })
        ));
    }

    #[test]
    fn header_is_not_left_alone_at_page_bottom() {
        let data = TableData::new(
            strings(&["Tag"]),
            vec![strings(&["A1"]), strings(&["A2"])],
        )
        .unwrap();
        let style = TableStyle::default().with_space_after(0.0);
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            p.advance_y(662.0).unwrap();
            assert!((p.remaining_height() - 30.0).abs() < 1e-9);
            let total = p.create_table(&data, &style).unwrap();
            assert!((total - 60.0).abs() < 1e-9);
            assert_eq!(p.page_count(), 2);
        }
        assert!(canvas.pages()[0].texts().is_empty());
        assert_eq!(canvas.pages()[1].texts(), vec!["Tag", "A1", "A2"]);
    }

    #[test]
    fn page_tall_header_leaves_room_for_a_row() {
        let header = vec!["heading"; 3000].join(" ");
        let data = TableData::new(vec![header], vec![strings(&["x"])]).unwrap();
        let style = TableStyle::default().with_space_after(0.0);
        let mut canvas = RecordingCanvas::new();
        {
            let mut p = Paginator::new(letter(), &mut canvas).unwrap();
            let total = p.create_table(&data, &style).unwrap();
            assert!((total - 692.0).abs() < 1e-9);
            assert_eq!(p.page_count(), 1);
        }
        let page = &canvas.pages()[0];
        assert!(page.texts().contains(&"x"));
        for op in &page.ops {
            if let DrawOp::Text { y, .. } = op {
                assert!(*y >= 50.0, "text at {y} below the bottom margin");
            }
        }
    }
}
