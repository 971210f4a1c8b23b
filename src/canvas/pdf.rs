//! # PDF Canvas
//!
//! A [`Canvas`] that writes a PDF 1.7 file. Each page's drawing calls are
//! appended to an in-memory content stream; [`PdfCanvas::finish`] assembles
//! the objects, compresses the streams and writes the cross-reference table.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj Catalog      2 0 obj Pages
//! n 0 obj Font / Image XObject / content stream / Page ...
//! xref, trailer, %%EOF
//! ```
//!
//! Only the standard Type1 fonts are used, so no font data is embedded.
//! Text is encoded as WinAnsi. The `{{totalPages}}` placeholder is replaced
//! in every content stream once the final page count is known.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use super::{Canvas, Point, Rect, Stroke};
use crate::error::CanvasError;
use crate::font::{FontContext, FontSpec, StandardFont, TextMeasure};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::model::Metadata;
use crate::style::Color;

pub const TOTAL_PAGES_PLACEHOLDER: &str = "{{totalPages}}";

#[derive(Debug, Default)]
pub struct PdfCanvas {
    fonts: FontContext,
    pages: Vec<PdfPage>,
    open: bool,
    /// Fonts in first-use order; index `i` is resource `/Fi`.
    font_resources: Vec<StandardFont>,
    /// Images in first-use order; index `i` is resource `/Imi`.
    images: Vec<LoadedImage>,
}

#[derive(Debug)]
struct PdfPage {
    width: f64,
    height: f64,
    content: String,
    fonts: BTreeSet<usize>,
    images: BTreeSet<usize>,
}

impl PdfCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontContext) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self) -> Result<&mut PdfPage, CanvasError> {
        if !self.open {
            return Err(CanvasError::NoOpenPage);
        }
        self.pages.last_mut().ok_or(CanvasError::NoOpenPage)
    }

    fn font_index(&mut self, font: &FontSpec) -> usize {
        let std_font = self.fonts.resolve(font);
        match self.font_resources.iter().position(|f| *f == std_font) {
            Some(idx) => idx,
            None => {
                self.font_resources.push(std_font);
                self.font_resources.len() - 1
            }
        }
    }

    fn write_text_object(
        &mut self,
        text: &str,
        font: &FontSpec,
        color: Color,
        matrix: String,
    ) -> Result<(), CanvasError> {
        let idx = self.font_index(font);
        let encoded = encode_winansi(text);
        let page = self.page()?;
        page.fonts.insert(idx);
        let _ = write!(
            page.content,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.2} Tf\n{}\n({}) Tj\nET\n",
            color.r, color.g, color.b, idx, font.size, matrix, encoded
        );
        Ok(())
    }

    /// Finish the document and return the PDF bytes.
    pub fn finish(self, metadata: &Metadata) -> Result<Vec<u8>, CanvasError> {
        if self.open {
            return Err(CanvasError::PageAlreadyOpen);
        }

        // Index 0 is the free-list head; 1 and 2 are filled in at the end.
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(), Vec::new(), Vec::new()];

        let font_ids: Vec<usize> = self
            .font_resources
            .iter()
            .map(|font| {
                push_object(
                    &mut objects,
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                )
            })
            .collect();

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|image| write_image_xobject(&mut objects, image))
            .collect();

        let total_pages = self.pages.len().to_string();
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = page.content.replace(TOTAL_PAGES_PLACEHOLDER, &total_pages);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let mut stream = Vec::new();
            let _ = write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = push_object(&mut objects, stream);

            let mut resources = String::from("/Font << ");
            for &idx in &page.fonts {
                let _ = write!(resources, "/F{} {} 0 R ", idx, font_ids[idx]);
            }
            resources.push_str(">>");
            if !page.images.is_empty() {
                resources.push_str(" /XObject << ");
                for &idx in &page.images {
                    let _ = write!(resources, "/Im{} {} 0 R ", idx, image_ids[idx]);
                }
                resources.push_str(">>");
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_id, resources
            );
            page_ids.push(push_object(&mut objects, page_dict.into_bytes()));
        }

        objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", escape_pdf_string(subject));
        }
        info.push_str("/Producer (pagewright) >>");
        let info_id = push_object(&mut objects, info.into_bytes());

        Ok(serialize(&objects, info_id))
    }
}

impl TextMeasure for PdfCanvas {
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.fonts.measure_text(text, font)
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), CanvasError> {
        if self.open {
            return Err(CanvasError::PageAlreadyOpen);
        }
        self.pages.push(PdfPage {
            width,
            height,
            content: String::new(),
            fonts: BTreeSet::new(),
            images: BTreeSet::new(),
        });
        self.open = true;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), CanvasError> {
        if !self.open {
            return Err(CanvasError::NoOpenPage);
        }
        self.open = false;
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
        self.write_text_object(text, font, color, format!("{x:.2} {y:.2} Td"))
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
        let (sin, cos) = angle.to_radians().sin_cos();
        let matrix = format!(
            "{:.4} {:.4} {:.4} {:.4} {:.2} {:.2} Tm",
            cos, sin, -sin, cos, x, y
        );
        self.write_text_object(text, font, color, matrix)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), CanvasError> {
        let page = self.page()?;
        let _ = write!(
            page.content,
            "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
            color.r, color.g, color.b, rect.x, rect.y, rect.width, rect.height
        );
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) -> Result<(), CanvasError> {
        let page = self.page()?;
        write_stroke_state(&mut page.content, stroke);
        let _ = write!(
            page.content,
            "{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
            rect.x, rect.y, rect.width, rect.height
        );
        Ok(())
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) -> Result<(), CanvasError> {
        let page = self.page()?;
        write_stroke_state(&mut page.content, stroke);
        let _ = write!(
            page.content,
            "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            from.x, from.y, to.x, to.y
        );
        Ok(())
    }

    fn draw_image(&mut self, image: &LoadedImage, rect: Rect) -> Result<(), CanvasError> {
        if !self.open {
            return Err(CanvasError::NoOpenPage);
        }
        // Identical images share one XObject.
        let idx = match self.images.iter().position(|embedded| embedded == image) {
            Some(idx) => idx,
            None => {
                self.images.push(image.clone());
                self.images.len() - 1
            }
        };
        let page = self.page()?;
        page.images.insert(idx);
        let _ = write!(
            page.content,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            rect.width, rect.height, rect.x, rect.y, idx
        );
        Ok(())
    }
}

/// Opens a graphics state (`q`) with the stroke color, width and dash set.
/// The caller closes it with `Q`.
fn write_stroke_state(stream: &mut String, stroke: &Stroke) {
    let _ = write!(
        stream,
        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n",
        stroke.color.r, stroke.color.g, stroke.color.b, stroke.width
    );
    if let Some(dash) = stroke.dash {
        let _ = write!(stream, "[{:.2} {:.2}] 0 d\n", dash.segment, dash.gap);
    }
}

fn push_object(objects: &mut Vec<Vec<u8>>, data: Vec<u8>) -> usize {
    objects.push(data);
    objects.len() - 1
}

/// Write an image as one XObject, preceded by an SMask XObject when it has
/// an alpha plane. Returns the id of the main XObject.
fn write_image_xobject(objects: &mut Vec<Vec<u8>>, image: &LoadedImage) -> usize {
    match &image.pixel_data {
        ImagePixelData::Jpeg { data, color_space } => {
            let color_space = match color_space {
                JpegColorSpace::DeviceRGB => "/DeviceRGB",
                JpegColorSpace::DeviceGray => "/DeviceGray",
            };
            let mut obj = Vec::new();
            let _ = write!(
                obj,
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                image.width_px,
                image.height_px,
                color_space,
                data.len()
            );
            obj.extend_from_slice(data);
            obj.extend_from_slice(b"\nendstream");
            push_object(objects, obj)
        }
        ImagePixelData::Decoded { rgb, alpha } => {
            let smask_ref = alpha
                .as_ref()
                .map(|alpha| {
                    let id = push_object(
                        objects,
                        flate_image_object(image, "/DeviceGray", alpha, ""),
                    );
                    format!(" /SMask {id} 0 R")
                })
                .unwrap_or_default();
            push_object(
                objects,
                flate_image_object(image, "/DeviceRGB", rgb, &smask_ref),
            )
        }
    }
}

fn flate_image_object(image: &LoadedImage, color_space: &str, raw: &[u8], extra: &str) -> Vec<u8> {
    let compressed = compress_to_vec_zlib(raw, 6);
    let mut obj = Vec::new();
    let _ = write!(
        obj,
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
         /ColorSpace {} /BitsPerComponent 8 /Filter /FlateDecode /Length {}{} >>\nstream\n",
        image.width_px,
        image.height_px,
        color_space,
        compressed.len(),
        extra
    );
    obj.extend_from_slice(&compressed);
    obj.extend_from_slice(b"\nendstream");
    obj
}

fn serialize(objects: &[Vec<u8>], info_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets = vec![0usize; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, data) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{i} 0 obj\n");
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len(),
        info_id,
        xref_offset
    );
    output
}

fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode text as a WinAnsi PDF string body, escaping delimiters and using
/// octal escapes outside printable ASCII. Unmappable characters become `?`.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out
}

/// Map a Unicode scalar to its Windows-1252 byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}
