//! Print raster normalization
//!
//! Turns an arbitrary source image into the raster that gets embedded for a
//! card: exactly 1488×2079 pixels (63×88mm at 600 dpi), no alpha channel, and
//! JPEG-encoded at a fixed quality.
//!
//! Nothing here keeps state between calls, so independent payloads can be
//! normalized from any thread.

use crate::constants::{JPEG_QUALITY, RASTER_HEIGHT_PX, RASTER_WIDTH_PX};
use crate::payload::{ImagePayload, PayloadFormat};
use crate::types::{LayoutError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba};

/// Resampling filter for card rasters (bicubic).
pub const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// A card raster ready to embed
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRaster {
    payload: ImagePayload,
    width: u32,
    height: u32,
}

impl PrintRaster {
    /// JPEG-encoded pixels
    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Normalize a payload to the card print raster.
pub fn normalize_for_print(source: &ImagePayload) -> Result<PrintRaster> {
    normalize_to(source, RASTER_WIDTH_PX, RASTER_HEIGHT_PX)
}

/// Normalize a payload to an explicit raster size.
pub fn normalize_to(source: &ImagePayload, width: u32, height: u32) -> Result<PrintRaster> {
    let decoded = source.decode()?;

    let opaque = flatten_onto_white(decoded);
    let resized = if opaque.dimensions() == (width, height) {
        opaque
    } else {
        imageops::resize(&opaque, width, height, RESAMPLE_FILTER)
    };

    let bytes = encode_jpeg(&resized)?;

    Ok(PrintRaster {
        payload: ImagePayload::new(PayloadFormat::Jpeg, bytes),
        width,
        height,
    })
}

/// Composite any alpha channel over white and drop it
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .encode_image(img)
        .map_err(|e| LayoutError::Encode(e.to_string()))?;
    Ok(bytes)
}
