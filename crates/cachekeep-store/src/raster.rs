//! Raster image entries.
//!
//! Images are encoded in memory with the caller's format and quality, then
//! written as one buffer. Reads sniff the format from the bytes.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageResult};
use serde::{Deserialize, Serialize};

use crate::name::EntryPath;
use crate::raw::RawStore;
use crate::{CacheError, Result};

/// Highest accepted quality value.
pub const MAX_QUALITY: u8 = 100;

/// Compression format used when writing an image entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// Lossless formats ignore the quality argument.
    pub fn is_lossless(self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
        })
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unsupported image format: {s}"))
    }
}

/// Encode `image` into a byte buffer.
///
/// `quality` is clamped to 1..=100 for JPEG and ignored otherwise. Pixel
/// layouts a format cannot hold are converted to the nearest 8-bit (or, for
/// PNG, 16-bit) layout first.
pub fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> ImageResult<Vec<u8>> {
    let image = encodable(image, format);
    let mut buf = Vec::new();
    match format {
        ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut buf))?,
        ImageFormat::Jpeg => {
            let quality = quality.clamp(1, MAX_QUALITY);
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?
        }
        ImageFormat::Bmp => image.write_with_encoder(BmpEncoder::new(&mut buf))?,
    }
    Ok(buf)
}

/// Decode an image from bytes, detecting the format from its signature.
pub fn decode(bytes: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match (format, image) {
        (ImageFormat::Png, DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)) => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        (ImageFormat::Png, _) => Cow::Borrowed(image),
        (ImageFormat::Jpeg, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => {
            Cow::Borrowed(image)
        }
        (ImageFormat::Jpeg, _) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        (
            ImageFormat::Bmp,
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_),
        ) => Cow::Borrowed(image),
        (ImageFormat::Bmp, _) if image.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        (ImageFormat::Bmp, _) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

/// Encode and store an image entry. Encoder errors are write failures.
pub fn write_image(
    raw: &RawStore,
    entry: &EntryPath,
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<()> {
    let bytes = encode(image, format, quality).map_err(|e| CacheError::write_failed(entry, e))?;
    raw.write_bytes(entry, &bytes)
}

/// Load and decode an image entry.
///
/// Bytes that are not a recognizable, complete image are a
/// [`CacheError::DecodeFailed`], never an empty image.
pub fn read_image(raw: &RawStore, entry: &EntryPath) -> Result<DynamicImage> {
    let bytes = raw.read_bytes(entry)?;
    decode(&bytes).map_err(|source| CacheError::DecodeFailed {
        name: entry.name().to_string(),
        source,
    })
}
