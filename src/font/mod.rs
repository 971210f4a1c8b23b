//! # Font Management
//!
//! Font selection and text measurement for the 14 standard PDF fonts, which
//! every PDF reader ships and which therefore never need embedding.
//!
//! Family names are matched case-insensitively through an alias table, so
//! "Arial" and "sans-serif" resolve to Helvetica. Unknown families fall back
//! to Helvetica.

pub mod metrics;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use metrics::StandardFontMetrics;

use crate::style::FontWeight;

/// A concrete font request: family, weight, slant and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub weight: FontWeight,
    pub italic: bool,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.to_string(),
            weight: FontWeight::Normal,
            italic: false,
            size,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }
}

/// Anything that can tell how wide a string is in a given font.
pub trait TextMeasure {
    /// Width of `text` in points.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

/// The standard PDF fonts the engine can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn select(family: FontFamily, weight: FontWeight, italic: bool) -> Self {
        let bold = weight == FontWeight::Bold;
        match (family, bold, italic) {
            (FontFamily::Helvetica, false, false) => Self::Helvetica,
            (FontFamily::Helvetica, true, false) => Self::HelveticaBold,
            (FontFamily::Helvetica, false, true) => Self::HelveticaOblique,
            (FontFamily::Helvetica, true, true) => Self::HelveticaBoldOblique,
            (FontFamily::Times, false, false) => Self::TimesRoman,
            (FontFamily::Times, true, false) => Self::TimesBold,
            (FontFamily::Times, false, true) => Self::TimesItalic,
            (FontFamily::Times, true, true) => Self::TimesBoldItalic,
            (FontFamily::Courier, false, false) => Self::Courier,
            (FontFamily::Courier, true, false) => Self::CourierBold,
            (FontFamily::Courier, false, true) => Self::CourierOblique,
            (FontFamily::Courier, true, true) => Self::CourierBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
            Self::TimesItalic => &metrics::TIMES_ITALIC,
            Self::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => &metrics::COURIER,
        }
    }
}

/// Shared font context used by canvases for selection and measurement.
#[derive(Debug, Clone)]
pub struct FontContext {
    aliases: HashMap<String, FontFamily>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        let mut aliases = HashMap::new();
        let builtin = [
            ("helvetica", FontFamily::Helvetica),
            ("arial", FontFamily::Helvetica),
            ("sans-serif", FontFamily::Helvetica),
            ("times", FontFamily::Times),
            ("times-roman", FontFamily::Times),
            ("times new roman", FontFamily::Times),
            ("serif", FontFamily::Times),
            ("courier", FontFamily::Courier),
            ("courier new", FontFamily::Courier),
            ("monospace", FontFamily::Courier),
        ];
        for (name, family) in builtin {
            aliases.insert(name.to_string(), family);
        }
        Self { aliases }
    }

    /// Map an additional family name onto one of the standard families.
    pub fn register_alias(&mut self, name: &str, family: FontFamily) {
        self.aliases.insert(name.to_lowercase(), family);
    }

    pub fn family(&self, name: &str) -> FontFamily {
        self.aliases
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(FontFamily::Helvetica)
    }

    /// Resolve a font request to the standard font that will be drawn.
    pub fn resolve(&self, font: &FontSpec) -> StandardFont {
        StandardFont::select(self.family(&font.family), font.weight, font.italic)
    }

    pub fn char_width(&self, ch: char, font: &FontSpec) -> f64 {
        self.resolve(font).metrics().char_width(ch, font.size)
    }
}

impl TextMeasure for FontContext {
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.resolve(font).metrics().measure_string(text, font.size, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', &FontSpec::new("Helvetica", 12.0));
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.measure_text("Asset", &FontSpec::new("Helvetica", 12.0));
        let bold = ctx.measure_text("Asset", &FontSpec::new("Helvetica", 12.0).bold());
        assert!(bold > regular, "bold text should be wider than regular");
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.measure_text("A", &FontSpec::new("Helvetica", 12.0));
        let w2 = ctx.measure_text("A", &FontSpec::new("UnknownFont", 12.0));
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn test_alias_resolution_is_case_insensitive() {
        let mut ctx = FontContext::new();
        assert_eq!(
            ctx.resolve(&FontSpec::new("Times New Roman", 10.0)),
            StandardFont::TimesRoman
        );
        ctx.register_alias("Consolas", FontFamily::Courier);
        let mut spec = FontSpec::new("CONSOLAS", 10.0).bold();
        spec.italic = true;
        assert_eq!(ctx.resolve(&spec), StandardFont::CourierBoldOblique);
    }

    #[test]
    fn test_measure_scales_with_size() {
        let ctx = FontContext::new();
        let small = ctx.measure_text("Ticket", &FontSpec::new("Helvetica", 10.0));
        let large = ctx.measure_text("Ticket", &FontSpec::new("Helvetica", 20.0));
        assert!((large - 2.0 * small).abs() < 1e-9);
    }

    #[test]
    fn test_times_italic_measured_with_italic_widths() {
        let ctx = FontContext::new();
        let upright = FontSpec::new("Times", 10.0);
        let mut italic = upright.clone();
        italic.italic = true;
        let roman = ctx.measure_text("Maintenance", &upright);
        let slanted = ctx.measure_text("Maintenance", &italic);
        assert!((roman - 51.65).abs() < 1e-9);
        assert!((slanted - 52.21).abs() < 1e-9);
    }
}
