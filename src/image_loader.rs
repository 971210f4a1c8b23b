//! # Image Loading
//!
//! Turns an image source (data URI, file path or raw base64) into pixel data
//! a canvas can embed. JPEG bytes are kept as-is, since PDF decodes them
//! natively (DCTDecode). PNG is decoded to RGB with a separate alpha plane.

use std::io::Cursor;

use base64::Engine;

use crate::error::CanvasError;

/// A loaded image ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Height divided by width; 1.0 for a degenerate zero-width image.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width_px == 0 {
            1.0
        } else {
            self.height_px as f64 / self.width_px as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Raw JPEG stream.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// width * height * 3 bytes of RGB, plus width * height bytes of alpha
    /// when any pixel is not fully opaque.
    Decoded { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from `src`:
/// - `data:image/...;base64,...`
/// - a path starting with `/`, `./` or `../`
/// - anything else is treated as raw base64
pub fn load_image(src: &str) -> Result<LoadedImage, CanvasError> {
    let bytes = read_source_bytes(src)?;
    decode_image_bytes(&bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>, CanvasError> {
    if let Some(rest) = src.strip_prefix("data:image/") {
        let (_, payload) = rest
            .split_once(',')
            .ok_or_else(|| CanvasError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(payload);
    }

    // Base64 may contain '/', so only explicit path prefixes count as paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| CanvasError::Image(format!("failed to read image file '{src}': {e}")));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, CanvasError> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| CanvasError::Image(format!("base64 decode error: {e}")))
}

/// Sniff the format from magic bytes and decode.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, CanvasError> {
    if data.len() < 4 {
        return Err(CanvasError::Image("image data too short".to_string()));
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(CanvasError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, CanvasError> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CanvasError::Image(format!("JPEG format detection error: {e}")))?
        .into_dimensions()
        .map_err(|e| CanvasError::Image(format!("failed to read JPEG dimensions: {e}")))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG marker segments to the first SOF and read its component
/// count. One component means grayscale.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, CanvasError> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CanvasError::Image(format!("PNG format detection error: {e}")))?
        .decode()
        .map_err(|e| CanvasError::Image(format!("failed to decode PNG: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixel_count = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let translucent = alpha.iter().any(|&a| a != 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: translucent.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, alpha]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(matches!(
            load_image("data:image/png;base64"),
            Err(CanvasError::Image(_))
        ));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_image_bytes(&[0x00, 0x01]).is_err());
        assert!(decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_image("./does/not/exist.png").is_err());
    }

    #[test]
    fn test_png_opaque_has_no_alpha() {
        let loaded = decode_image_bytes(&png_bytes(2, 1, 255)).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (2, 1));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[200, 30, 30, 200, 30, 30]);
                assert!(alpha.is_none());
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_png_with_alpha_keeps_alpha_plane() {
        let loaded = decode_image_bytes(&png_bytes(1, 1, 128)).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => assert_eq!(alpha.as_deref(), Some(&[128][..])),
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_jpeg_passes_through() {
        let img = image::RgbImage::from_fn(4, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (4, 2));
        assert!((loaded.aspect_ratio() - 0.5).abs() < 1e-9);
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert_eq!(data, &buf);
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_data_uri_and_raw_base64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 3, 255));
        let from_uri = load_image(&format!("data:image/png;base64,{b64}")).unwrap();
        let from_raw = load_image(&b64).unwrap();
        assert_eq!(from_uri.width_px, 3);
        assert_eq!(from_raw.height_px, 3);
    }
}
