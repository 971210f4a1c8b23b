//! # Style Configuration
//!
//! Plain value objects consumed by the layout engines. Every style is an
//! owned, `Clone` value: a preset such as [`TableStyle::minimal`] returns a
//! fresh instance, and the `with_*` methods consume and return `self`, so
//! customizing one table's style can never leak into another.
//!
//! All styles deserialize from camelCase JSON with every field optional;
//! missing fields take the values of the `Default` preset.

use serde::{Deserialize, Serialize};

use crate::canvas::DashPattern;
use crate::error::{LayoutError, Result};
use crate::font::FontSpec;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const GRAY: Color = Color {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };
    pub const LIGHT_GRAY: Color = Color {
        r: 0.85,
        g: 0.85,
        b: 0.85,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HAlign {
    /// Offset from the left edge of a box of `available` width at which
    /// content of `content` width starts.
    pub fn offset(&self, available: f64, content: f64) -> f64 {
        match self {
            HAlign::Left => 0.0,
            HAlign::Center => (available - content) / 2.0,
            HAlign::Right => available - content,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

impl BorderStyle {
    /// Dash pattern for this border style. `None` for solid lines; dotted
    /// lines are a dash pattern with a very short segment.
    pub fn dash_pattern(&self) -> Option<DashPattern> {
        match self {
            BorderStyle::Dashed => Some(DashPattern {
                segment: 4.0,
                gap: 2.0,
            }),
            BorderStyle::Dotted => Some(DashPattern {
                segment: 1.0,
                gap: 2.0,
            }),
            BorderStyle::Solid | BorderStyle::None => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, BorderStyle::None)
    }
}

// ── Text ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in points.
    pub font_size: f64,
    pub weight: FontWeight,
    pub italic: bool,
    pub color: Color,
    pub align: HAlign,
    pub v_align: VAlign,
    /// Line height as a multiplier of font size.
    pub line_spacing: f64,
    /// Vertical space added after the text block.
    pub space_after: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::body()
    }
}

impl TextStyle {
    pub fn body() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 10.0,
            weight: FontWeight::Normal,
            italic: false,
            color: Color::BLACK,
            align: HAlign::Left,
            v_align: VAlign::Top,
            line_spacing: 1.2,
            space_after: 4.0,
        }
    }

    pub fn title() -> Self {
        Self::body()
            .with_size(20.0)
            .with_weight(FontWeight::Bold)
            .with_align(HAlign::Center)
            .with_space_after(12.0)
    }

    pub fn heading() -> Self {
        Self::body()
            .with_size(14.0)
            .with_weight(FontWeight::Bold)
            .with_space_after(6.0)
    }

    pub fn subheading() -> Self {
        Self::body()
            .with_size(12.0)
            .with_weight(FontWeight::Bold)
            .with_color(Color::hex("#333333"))
    }

    pub fn caption() -> Self {
        Self::body()
            .with_size(8.0)
            .with_italic(true)
            .with_color(Color::GRAY)
            .with_space_after(2.0)
    }

    pub fn monospace() -> Self {
        Self::body().with_family("Courier").with_size(9.0)
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.font_family = family.to_string();
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn bold(self) -> Self {
        self.with_weight(FontWeight::Bold)
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_v_align(mut self, v_align: VAlign) -> Self {
        self.v_align = v_align;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_space_after(mut self, space_after: f64) -> Self {
        self.space_after = space_after;
        self
    }

    pub fn font(&self) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            weight: self.weight,
            italic: self.italic,
            size: self.font_size,
        }
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.font_size * self.line_spacing
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.font_size > 0.0) {
            return Err(LayoutError::InvalidStyle(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !(self.line_spacing > 0.0) {
            return Err(LayoutError::InvalidStyle(format!(
                "line spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        if self.space_after < 0.0 {
            return Err(LayoutError::InvalidStyle(
                "space after text cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Table ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowHeight {
    /// Every row has this height (raised to the minimum a line of text needs).
    Fixed(f64),
    /// Each row is as tall as its tallest wrapped cell.
    Auto,
}

impl Default for RowHeight {
    fn default() -> Self {
        RowHeight::Auto
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    pub header: TextStyle,
    pub body: TextStyle,
    pub header_background: Option<Color>,
    /// Fill of even body rows.
    pub row_background: Option<Color>,
    /// Fill of odd body rows. `None` disables alternation.
    pub alternate_row_background: Option<Color>,
    pub border: BorderStyle,
    pub border_color: Color,
    pub border_width: f64,
    /// Padding applied on all four sides of every cell.
    pub cell_padding: f64,
    pub row_height: RowHeight,
    /// Explicit table width. Defaults to the usable page width.
    pub width: Option<f64>,
    /// Per-column horizontal alignment overriding the text styles.
    pub column_align: Vec<HAlign>,
    pub space_after: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header: TextStyle::body().bold().with_color(Color::WHITE).with_space_after(0.0),
            body: TextStyle::body().with_space_after(0.0),
            header_background: Some(Color::hex("#2f4f6f")),
            row_background: Some(Color::WHITE),
            alternate_row_background: Some(Color::hex("#f0f3f6")),
            border: BorderStyle::Solid,
            border_color: Color::hex("#b0b8c0"),
            border_width: 0.5,
            cell_padding: 4.0,
            row_height: RowHeight::Auto,
            width: None,
            column_align: Vec::new(),
            space_after: 8.0,
        }
    }
}

impl TableStyle {
    /// No fills, no alternation, thin dotted rules.
    pub fn minimal() -> Self {
        Self {
            header: TextStyle::body().bold().with_space_after(0.0),
            header_background: None,
            row_background: None,
            alternate_row_background: None,
            border: BorderStyle::Dotted,
            border_color: Color::GRAY,
            ..Self::default()
        }
    }

    /// Full black grid, plain header.
    pub fn grid() -> Self {
        Self {
            header: TextStyle::body().bold().with_space_after(0.0),
            header_background: Some(Color::LIGHT_GRAY),
            alternate_row_background: None,
            border_color: Color::BLACK,
            border_width: 0.75,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: TextStyle) -> Self {
        self.header = header;
        self
    }

    pub fn with_body(mut self, body: TextStyle) -> Self {
        self.body = body;
        self
    }

    pub fn with_header_background(mut self, color: Option<Color>) -> Self {
        self.header_background = color;
        self
    }

    pub fn with_row_backgrounds(mut self, base: Option<Color>, alternate: Option<Color>) -> Self {
        self.row_background = base;
        self.alternate_row_background = alternate;
        self
    }

    pub fn with_border(mut self, border: BorderStyle, color: Color, width: f64) -> Self {
        self.border = border;
        self.border_color = color;
        self.border_width = width;
        self
    }

    pub fn with_cell_padding(mut self, padding: f64) -> Self {
        self.cell_padding = padding;
        self
    }

    pub fn with_row_height(mut self, row_height: RowHeight) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_column_align(mut self, align: Vec<HAlign>) -> Self {
        self.column_align = align;
        self
    }

    pub fn with_space_after(mut self, space_after: f64) -> Self {
        self.space_after = space_after;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;
        self.body.validate()?;
        if self.cell_padding < 0.0 {
            return Err(LayoutError::InvalidStyle(
                "cell padding cannot be negative".to_string(),
            ));
        }
        if self.border_width < 0.0 {
            return Err(LayoutError::InvalidStyle(
                "border width cannot be negative".to_string(),
            ));
        }
        if let RowHeight::Fixed(h) = self.row_height {
            if !(h > 0.0) {
                return Err(LayoutError::InvalidStyle(format!(
                    "fixed row height must be positive, got {h}"
                )));
            }
        }
        if let Some(w) = self.width {
            if !(w > 0.0) {
                return Err(LayoutError::InvalidStyle(format!(
                    "table width must be positive, got {w}"
                )));
            }
        }
        Ok(())
    }
}

// ── Line ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineStyle {
    pub thickness: f64,
    pub color: Color,
    pub border: BorderStyle,
    pub space_before: f64,
    pub space_after: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::thin()
    }
}

impl LineStyle {
    pub fn thin() -> Self {
        Self {
            thickness: 0.5,
            color: Color::GRAY,
            border: BorderStyle::Solid,
            space_before: 4.0,
            space_after: 4.0,
        }
    }

    pub fn thick() -> Self {
        Self::thin().with_thickness(2.0).with_color(Color::BLACK)
    }

    pub fn dashed() -> Self {
        Self::thin().with_border(BorderStyle::Dashed)
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn with_spacing(mut self, before: f64, after: f64) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

// ── Image ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStyle {
    /// Display width in points. Derived from height or pixels when absent.
    pub width: Option<f64>,
    /// Display height in points. Derived from width or pixels when absent.
    pub height: Option<f64>,
    pub align: HAlign,
    pub space_after: f64,
}

impl ImageStyle {
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_space_after(mut self, space_after: f64) -> Self {
        self.space_after = space_after;
        self
    }
}

// ── Barcode ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeStyle {
    /// Edge length of the square symbol in points, quiet zone included.
    pub size: f64,
    /// Quiet zone width in modules.
    pub quiet_zone: u32,
    pub color: Color,
    pub background: Option<Color>,
    pub error_correction: ErrorCorrection,
    pub align: HAlign,
    /// Print the encoded data below the symbol.
    pub caption: bool,
    pub caption_style: TextStyle,
    pub space_after: f64,
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self {
            size: 96.0,
            quiet_zone: 4,
            color: Color::BLACK,
            background: None,
            error_correction: ErrorCorrection::Medium,
            align: HAlign::Left,
            caption: false,
            caption_style: TextStyle::caption().with_italic(false),
            space_after: 8.0,
        }
    }
}

impl BarcodeStyle {
    /// A compact label-sized symbol with its data printed underneath.
    pub fn label() -> Self {
        Self {
            size: 64.0,
            quiet_zone: 2,
            caption: true,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_align(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_caption(mut self, caption: bool) -> Self {
        self.caption = caption;
        self
    }

    pub fn with_error_correction(mut self, level: ErrorCorrection) -> Self {
        self.error_correction = level;
        self
    }

    pub fn with_quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }
}

// ── Page decorations ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub weight: FontWeight,
    pub color: Color,
    /// Counter-clockwise rotation in degrees.
    pub angle: f64,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Helvetica".to_string(),
            font_size: 60.0,
            weight: FontWeight::Bold,
            color: Color::rgb(0.92, 0.92, 0.92),
            angle: 45.0,
        }
    }
}

impl WatermarkStyle {
    pub fn confidential() -> Self {
        Self::default().with_text("CONFIDENTIAL")
    }

    pub fn draft() -> Self {
        Self::default().with_text("DRAFT")
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn font(&self) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            weight: self.weight,
            italic: false,
            size: self.font_size,
        }
    }
}

/// Running footer drawn inside the bottom margin of every page.
///
/// The template may contain `{{pageNumber}}` and `{{totalPages}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterStyle {
    pub template: String,
    pub style: TextStyle,
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            template: "Page {{pageNumber}} of {{totalPages}}".to_string(),
            style: TextStyle::caption().with_italic(false).with_align(HAlign::Center),
        }
    }
}

impl FooterStyle {
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        let c = Color::hex("#ff8000");
        assert!((c.r - 1.0).abs() < 1e-9);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert!(c.b.abs() < 1e-9);
        let short = Color::hex("fff");
        assert_eq!(short, Color::WHITE);
    }

    #[test]
    fn presets_are_independent_values() {
        let base = TableStyle::minimal();
        let customized = base.clone().with_cell_padding(10.0);
        assert!((base.cell_padding - 4.0).abs() < 1e-9);
        assert!((customized.cell_padding - 10.0).abs() < 1e-9);
        assert!((TableStyle::minimal().cell_padding - 4.0).abs() < 1e-9);
    }

    #[test]
    fn minimal_table_has_no_fills() {
        let s = TableStyle::minimal();
        assert!(s.header_background.is_none());
        assert!(s.alternate_row_background.is_none());
        assert_eq!(s.border, BorderStyle::Dotted);
    }

    #[test]
    fn text_style_line_height() {
        let s = TextStyle::body().with_size(10.0).with_line_spacing(1.5);
        assert!((s.line_height() - 15.0).abs() < 1e-9);
        assert_eq!(s.font().weight, FontWeight::Normal);
        assert_eq!(TextStyle::heading().font().weight, FontWeight::Bold);
    }

    #[test]
    fn invalid_text_style_is_rejected() {
        assert!(TextStyle::body().with_size(0.0).validate().is_err());
        assert!(TextStyle::body().with_line_spacing(-1.0).validate().is_err());
        assert!(TextStyle::body().validate().is_ok());
    }

    #[test]
    fn invalid_table_style_is_rejected() {
        assert!(TableStyle::default().with_cell_padding(-1.0).validate().is_err());
        assert!(TableStyle::default()
            .with_row_height(RowHeight::Fixed(0.0))
            .validate()
            .is_err());
        assert!(TableStyle::grid().validate().is_ok());
    }

    #[test]
    fn dash_patterns_for_border_styles() {
        assert!(BorderStyle::Solid.dash_pattern().is_none());
        let dotted = BorderStyle::Dotted.dash_pattern().unwrap();
        let dashed = BorderStyle::Dashed.dash_pattern().unwrap();
        assert!(dotted.segment < dashed.segment);
        assert!(!BorderStyle::None.is_visible());
    }

    #[test]
    fn h_align_offsets() {
        assert_eq!(HAlign::Left.offset(100.0, 40.0), 0.0);
        assert_eq!(HAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(HAlign::Right.offset(100.0, 40.0), 60.0);
    }

    #[test]
    fn table_style_from_partial_json() {
        let s: TableStyle = serde_json::from_str(
            r#"{"cellPadding": 6, "rowHeight": {"Fixed": 25}, "border": "Dashed"}"#,
        )
        .unwrap();
        assert!((s.cell_padding - 6.0).abs() < 1e-9);
        assert_eq!(s.row_height, RowHeight::Fixed(25.0));
        assert_eq!(s.border, BorderStyle::Dashed);
        assert_eq!(s.body, TableStyle::default().body);
    }
}
