//! # Report Model
//!
//! The input description of a report: page setup, decorations and an
//! ordered list of content blocks. Everything is plain serde data, so a
//! report is usually written as JSON:
//!
//! ```json
//! {
//!   "metadata": { "title": "Asset Inventory" },
//!   "page": { "size": "A4", "orientation": "Landscape" },
//!   "footer": {},
//!   "blocks": [
//!     { "type": "heading", "content": "Laptops" },
//!     { "type": "table", "header": ["Tag", "Model"], "rows": [["A-1", "X1"]] }
//!   ]
//! }
//! ```
//!
//! Omitted fields take their defaults; a bare `{}` is a valid, empty report.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::Result;
use crate::geometry::{PageConfig, PageGeometry};
use crate::paginator::{Decorations, Paginator};
use crate::style::{
    BarcodeStyle, FooterStyle, ImageStyle, LineStyle, TableStyle, TextStyle, WatermarkStyle,
};
use crate::table::TableData;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    pub metadata: Metadata,
    pub page: PageConfig,
    pub watermark: Option<WatermarkStyle>,
    pub footer: Option<FooterStyle>,
    pub blocks: Vec<Block>,
}

/// One piece of content, laid out in order at the cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Text {
        content: String,
        #[serde(default)]
        style: TextStyle,
    },
    Heading {
        content: String,
        #[serde(default = "TextStyle::heading")]
        style: TextStyle,
    },
    TextBox {
        content: String,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        style: TextStyle,
    },
    Table {
        header: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
        #[serde(default, rename = "columnRatios")]
        column_ratios: Option<Vec<f64>>,
        #[serde(default)]
        style: TableStyle,
    },
    Image {
        src: String,
        #[serde(default)]
        style: ImageStyle,
    },
    Barcode {
        data: String,
        #[serde(default)]
        style: BarcodeStyle,
    },
    Line {
        #[serde(default)]
        style: LineStyle,
    },
    Space {
        height: f64,
    },
    PageBreak,
}

impl Report {
    fn decorations(&self) -> Decorations {
        Decorations {
            watermark: self.watermark.clone(),
            footer: self.footer.clone(),
        }
    }
}

/// Lay out every block of `report` onto `canvas` and return the page count.
///
/// The last page is always released, also when a block fails.
pub fn layout_report<C: Canvas + ?Sized>(report: &Report, canvas: &mut C) -> Result<usize> {
    let geometry = PageGeometry::from_config(&report.page)?;
    let mut paginator = Paginator::with_decorations(geometry, canvas, report.decorations())?;
    for (i, block) in report.blocks.iter().enumerate() {
        debug!(block = i, page = paginator.page_count(), "laying out block");
        layout_block(&mut paginator, block)?;
    }
    paginator.close()?;
    Ok(paginator.page_count())
}

fn layout_block<C: Canvas + ?Sized>(paginator: &mut Paginator<'_, C>, block: &Block) -> Result<()> {
    match block {
        Block::Text { content, style } => {
            paginator.write_text(content, style)?;
        }
        Block::Heading { content, style } => {
            paginator.write_heading(content, style)?;
        }
        Block::TextBox {
            content,
            width,
            height,
            style,
        } => {
            paginator.write_text_box(content, *width, *height, style)?;
        }
        Block::Table {
            header,
            rows,
            column_ratios,
            style,
        } => {
            let mut data = TableData::new(header.clone(), rows.clone())?;
            if let Some(ratios) = column_ratios {
                data = data.with_column_ratios(ratios.clone())?;
            }
            paginator.create_table(&data, style)?;
        }
        Block::Image { src, style } => {
            paginator.insert_image(src, style)?;
        }
        Block::Barcode { data, style } => {
            paginator.insert_barcode(data, style)?;
        }
        Block::Line { style } => {
            paginator.draw_line(style)?;
        }
        Block::Space { height } => {
            paginator.add_space(*height)?;
        }
        Block::PageBreak => paginator.new_page()?,
    }
    Ok(())
}
