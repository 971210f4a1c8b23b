//! # Page Geometry
//!
//! Immutable description of a page: raw size, margins and orientation, plus
//! the derived quantities the paginator works with.
//!
//! Coordinates are PDF user space: the origin is the bottom-left corner of
//! the page and y grows upward. The writable cursor therefore starts at
//! [`PageGeometry::start_y`] (just below the top margin) and moves *down*
//! toward [`PageGeometry::min_y`] (the top of the bottom margin).

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    A3,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Page configuration as it appears in a report description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,

    #[serde(default)]
    pub orientation: Orientation,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margin: default_margin(),
        }
    }
}

fn default_margin() -> Edges {
    Edges::uniform(50.0)
}

/// A validated page description. Construct with [`PageGeometry::new`]; a
/// geometry whose margins swallow the page is rejected there, so every
/// value of this type has a positive usable area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    width: f64,
    height: f64,
    margin: Edges,
    orientation: Orientation,
}

impl PageGeometry {
    pub fn new(size: PageSize, orientation: Orientation, margin: Edges) -> Result<Self> {
        let (width, height) = size.dimensions();
        let geometry = Self {
            width,
            height,
            margin,
            orientation,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn from_config(config: &PageConfig) -> Result<Self> {
        Self::new(config.size, config.orientation, config.margin)
    }

    /// Fails with [`LayoutError::DegeneratePage`] unless both usable
    /// dimensions are strictly positive.
    pub fn validate(&self) -> Result<()> {
        let width = self.usable_width();
        let height = self.usable_height();
        // NaN margins fail both comparisons and land here too.
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::DegeneratePage { width, height });
        }
        Ok(())
    }

    /// Raw (width, height) as configured, before orientation.
    pub fn raw_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn margin(&self) -> Edges {
        self.margin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// (width, height) of the page as drawn; swapped when landscape.
    pub fn effective_size(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Portrait => (self.width, self.height),
            Orientation::Landscape => (self.height, self.width),
        }
    }

    pub fn usable_width(&self) -> f64 {
        self.effective_size().0 - self.margin.horizontal()
    }

    pub fn usable_height(&self) -> f64 {
        self.effective_size().1 - self.margin.vertical()
    }

    /// Topmost writable y (just below the top margin).
    pub fn start_y(&self) -> f64 {
        self.effective_size().1 - self.margin.top
    }

    /// Lowest writable y (top of the bottom margin).
    pub fn min_y(&self) -> f64 {
        self.margin.bottom
    }

    /// Leftmost writable x.
    pub fn start_x(&self) -> f64 {
        self.margin.left
    }

    /// Rightmost writable x.
    pub fn end_x(&self) -> f64 {
        self.effective_size().0 - self.margin.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(margin: f64) -> PageGeometry {
        PageGeometry::new(PageSize::Letter, Orientation::Portrait, Edges::uniform(margin)).unwrap()
    }

    #[test]
    fn letter_with_fifty_point_margins() {
        let g = letter(50.0);
        assert!((g.usable_width() - 512.0).abs() < 1e-9);
        assert!((g.usable_height() - 692.0).abs() < 1e-9);
        assert!((g.start_y() - 742.0).abs() < 1e-9);
        assert!((g.min_y() - 50.0).abs() < 1e-9);
        assert!((g.start_x() - 50.0).abs() < 1e-9);
        assert!((g.end_x() - 562.0).abs() < 1e-9);
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let g = PageGeometry::new(PageSize::Letter, Orientation::Landscape, Edges::uniform(50.0))
            .unwrap();
        assert_eq!(g.effective_size(), (792.0, 612.0));
        assert_eq!(g.raw_size(), (612.0, 792.0));
        assert!((g.usable_width() - 692.0).abs() < 1e-9);
        assert!((g.usable_height() - 512.0).abs() < 1e-9);
        assert!((g.start_y() - 562.0).abs() < 1e-9);
    }

    #[test]
    fn margins_consuming_the_page_are_rejected() {
        let err = PageGeometry::new(
            PageSize::Custom {
                width: 200.0,
                height: 300.0,
            },
            Orientation::Portrait,
            Edges::symmetric(10.0, 100.0),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::DegeneratePage { .. }));
    }

    #[test]
    fn orientation_is_considered_when_validating() {
        // Fits in portrait (width 200) but not once the page is turned.
        let size = PageSize::Custom {
            width: 200.0,
            height: 400.0,
        };
        let margin = Edges::symmetric(120.0, 10.0);
        assert!(PageGeometry::new(size, Orientation::Portrait, margin).is_ok());
        assert!(PageGeometry::new(size, Orientation::Landscape, margin).is_err());
    }

    #[test]
    fn usable_area_positive_whenever_margins_fit() {
        for &(w, h) in &[(100.0, 100.0), (612.0, 792.0), (30.0, 2000.0)] {
            for &m in &[0.0, 1.0, 14.9, 49.0] {
                let size = PageSize::Custom { width: w, height: h };
                let margin = Edges {
                    top: m,
                    bottom: m / 2.0,
                    left: m / 3.0,
                    right: m,
                };
                if margin.horizontal() < w && margin.vertical() < h {
                    let g = PageGeometry::new(size, Orientation::Portrait, margin).unwrap();
                    assert!(g.usable_width() > 0.0);
                    assert!(g.usable_height() > 0.0);
                }
            }
        }
    }

    #[test]
    fn page_config_defaults_from_json() {
        let config: PageConfig = serde_json::from_str(r#"{"orientation": "Landscape"}"#).unwrap();
        assert_eq!(config.size, PageSize::Letter);
        assert_eq!(config.orientation, Orientation::Landscape);
        assert_eq!(config.margin, Edges::uniform(50.0));
    }
}
