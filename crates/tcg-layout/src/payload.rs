//! Self-contained encoded images
//!
//! An [`ImagePayload`] is what intake and the crop transform hand to the
//! layout core. It is immutable and cheap to clone; the bytes are shared.

use crate::constants::MAX_PAYLOAD_BYTES;
use crate::types::{LayoutError, Result};
use std::path::Path;
use std::sync::Arc;

/// Encodings accepted at the intake boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadFormat {
    Png,
    Jpeg,
    Webp,
}

impl PayloadFormat {
    pub fn name(self) -> &'static str {
        match self {
            PayloadFormat::Png => "PNG",
            PayloadFormat::Jpeg => "JPEG",
            PayloadFormat::Webp => "WEBP",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            PayloadFormat::Png => image::ImageFormat::Png,
            PayloadFormat::Jpeg => image::ImageFormat::Jpeg,
            PayloadFormat::Webp => image::ImageFormat::WebP,
        }
    }

    fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(PayloadFormat::Png),
            image::ImageFormat::Jpeg => Some(PayloadFormat::Jpeg),
            image::ImageFormat::WebP => Some(PayloadFormat::Webp),
            _ => None,
        }
    }
}

/// An encoded image plus its format tag
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    format: PayloadFormat,
    bytes: Arc<[u8]>,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImagePayload {
    /// Wrap bytes that are already known to be in `format`.
    ///
    /// The bytes are not validated; a mismatch surfaces later as a decode
    /// error when the payload is rasterized.
    pub fn new(format: PayloadFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }

    /// Build a payload from user-supplied bytes, sniffing the format.
    ///
    /// Accepts PNG, JPEG and WEBP up to 10 MiB.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes: Arc<[u8]> = bytes.into();

        if bytes.len() > MAX_PAYLOAD_BYTES {
            return Err(LayoutError::PayloadTooLarge {
                size: bytes.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        let guessed = image::guess_format(&bytes)
            .map_err(|e| LayoutError::UnsupportedFormat(e.to_string()))?;
        let format = PayloadFormat::from_image_format(guessed)
            .ok_or_else(|| LayoutError::UnsupportedFormat(format!("{:?}", guessed)))?;

        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into pixels. Only the raster pipeline looks inside a payload.
    pub(crate) fn decode(&self) -> Result<image::DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, self.format.to_image_format())
            .map_err(|e| LayoutError::Decode(e.to_string()))
    }
}

/// Read an image file into a payload
pub async fn load_image(path: impl AsRef<Path>) -> Result<ImagePayload> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    ImagePayload::from_bytes(bytes)
}
