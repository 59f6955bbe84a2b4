//! Crop transform
//!
//! Cuts a card-shaped (63:88) window out of a source image after an optional
//! rotation and zoom, and returns it as a new PNG payload. Transparency is
//! kept; the print normalizer flattens it later.

use crate::constants::{CARD_HEIGHT_MM, CARD_WIDTH_MM, MAX_ZOOM, MIN_ZOOM};
use crate::payload::{ImagePayload, PayloadFormat};
use crate::types::{LayoutError, Result};
use image::imageops;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use std::io::Cursor;

/// Width over height of a card
pub const CARD_ASPECT: f32 = CARD_WIDTH_MM / CARD_HEIGHT_MM;

/// A rectangle in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// What to cut out of the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRequest {
    /// Region of interest, in the coordinates of the rotated image
    pub region: PixelRect,
    /// Magnification around the region center, 1 to 3
    pub zoom: f32,
    /// Clockwise rotation applied before cropping
    pub rotation_degrees: f32,
}

impl CropRequest {
    pub fn new(region: PixelRect) -> Self {
        Self {
            region,
            zoom: MIN_ZOOM,
            rotation_degrees: 0.0,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Check zoom and rotation, returning the rotation folded into [0, 360)
    pub fn validate(&self) -> Result<f32> {
        if !self.zoom.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            return Err(LayoutError::InvalidCrop(format!(
                "zoom {} outside {}..={}",
                self.zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }
        if !self.rotation_degrees.is_finite() {
            return Err(LayoutError::InvalidCrop(format!(
                "rotation {} is not a number of degrees",
                self.rotation_degrees
            )));
        }
        // rem_euclid rounds tiny negative angles up to exactly 360
        let rotation = self.rotation_degrees.rem_euclid(360.0);
        Ok(if rotation >= 360.0 { 0.0 } else { rotation })
    }
}

/// Crop `source` to a card-shaped PNG.
pub fn crop_to_card(source: &ImagePayload, request: &CropRequest) -> Result<ImagePayload> {
    let rotation = request.validate()?;

    let decoded = source.decode()?.into_rgba8();
    let rotated = rotate_about_center(&decoded, rotation);
    drop(decoded);

    let (x, y, width, height) = card_window(request.region, request.zoom, rotated.dimensions())?;
    let cropped = imageops::crop_imm(&rotated, x, y, width, height).to_image();

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(cropped)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| LayoutError::Encode(e.to_string()))?;

    Ok(ImagePayload::new(PayloadFormat::Png, bytes))
}

/// Rotate clockwise onto a canvas sized to the rotated extent.
fn rotate_about_center(img: &RgbaImage, degrees: f32) -> RgbaImage {
    match degrees {
        d if d == 0.0 => img.clone(),
        d if d == 90.0 => imageops::rotate90(img),
        d if d == 180.0 => imageops::rotate180(img),
        d if d == 270.0 => imageops::rotate270(img),
        d => rotate_bilinear(img, d.to_radians()),
    }
}

fn rotate_bilinear(img: &RgbaImage, radians: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let (sin, cos) = radians.sin_cos();

    // Rounded rather than ceiled so a near-zero angle keeps the source size
    let canvas_w = (w as f32 * cos.abs() + h as f32 * sin.abs()).round().max(1.0) as u32;
    let canvas_h = (w as f32 * sin.abs() + h as f32 * cos.abs()).round().max(1.0) as u32;

    // One replicated pixel on every side keeps bilinear samples at the
    // source edge inside the image
    let padded = RgbaImage::from_fn(w + 2, h + 2, |x, y| {
        *img.get_pixel(x.saturating_sub(1).min(w - 1), y.saturating_sub(1).min(h - 1))
    });

    let canvas_center = ((canvas_w as f32 - 1.0) / 2.0, (canvas_h as f32 - 1.0) / 2.0);
    let projection = Projection::translate(canvas_center.0, canvas_center.1)
        * Projection::rotate(radians)
        * Projection::translate(-(w as f32 + 1.0) / 2.0, -(h as f32 + 1.0) / 2.0);

    let mut canvas = RgbaImage::new(canvas_w, canvas_h);
    warp_into(
        &padded,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
        &mut canvas,
    );
    canvas
}

/// Integer window (x, y, width, height) inside a canvas for a request.
///
/// The region is shrunk about its center by the zoom, clamped to the canvas,
/// then trimmed to the largest centered card-shaped rectangle.
fn card_window(region: PixelRect, zoom: f32, canvas: (u32, u32)) -> Result<(u32, u32, u32, u32)> {
    let (canvas_w, canvas_h) = (canvas.0 as f32, canvas.1 as f32);

    let w = region.width as f32 / zoom;
    let h = region.height as f32 / zoom;
    let cx = region.x as f32 + region.width as f32 / 2.0;
    let cy = region.y as f32 + region.height as f32 / 2.0;

    let left = (cx - w / 2.0).max(0.0);
    let top = (cy - h / 2.0).max(0.0);
    let right = (cx + w / 2.0).min(canvas_w);
    let bottom = (cy + h / 2.0).min(canvas_h);

    let (w, h) = (right - left, bottom - top);
    if w < 1.0 || h < 1.0 {
        return Err(LayoutError::InvalidCrop(format!(
            "region {:?} does not overlap the {}x{} image",
            region, canvas.0, canvas.1
        )));
    }

    let (fit_w, fit_h) = if w / h > CARD_ASPECT {
        (h * CARD_ASPECT, h)
    } else {
        (w, w / CARD_ASPECT)
    };
    let fit_x = left + (w - fit_w) / 2.0;
    let fit_y = top + (h - fit_h) / 2.0;

    let width = (fit_w.round().max(1.0) as u32).min(canvas.0);
    let height = (fit_h.round().max(1.0) as u32).min(canvas.1);
    let x = (fit_x.round() as u32).min(canvas.0 - width);
    let y = (fit_y.round() as u32).min(canvas.1 - height);

    Ok((x, y, width, height))
}
