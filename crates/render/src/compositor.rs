//! Single-image compositor: paste a resized overlay onto the base and encode.
//!
//! The base is converted to the target color mode once per job
//! ([`prepare_base`]); every item then works on its own copy.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use postermill_common::error::{PostermillError, PostermillResult};
use postermill_model::{OutputFormat, PixelRect};

/// Below this JPEG quality the faster resampling filter is used.
pub const FAST_FILTER_BELOW_QUALITY: u8 = 85;

/// Base pixels in the color mode of the job's output format.
#[derive(Debug, Clone)]
enum Canvas {
    Rgba(RgbaImage),
    Rgb(RgbImage),
}

/// Base image converted once for a job, plus the format it encodes to.
#[derive(Debug, Clone)]
pub struct PreparedBase {
    canvas: Canvas,
    format: OutputFormat,
}

impl PreparedBase {
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match &self.canvas {
            Canvas::Rgba(img) => img.dimensions(),
            Canvas::Rgb(img) => img.dimensions(),
        }
    }
}

/// Convert the base to RGBA for lossless output or RGB for lossy output.
pub fn prepare_base(base: &DynamicImage, format: OutputFormat) -> PreparedBase {
    let canvas = if format.is_lossless() {
        Canvas::Rgba(base.to_rgba8())
    } else {
        Canvas::Rgb(base.to_rgb8())
    };
    PreparedBase { canvas, format }
}

/// Resampling filter for the overlay.
pub fn resize_filter(format: OutputFormat) -> FilterType {
    match format.quality() {
        Some(q) if q < FAST_FILTER_BELOW_QUALITY => FilterType::Triangle,
        _ => FilterType::Lanczos3,
    }
}

/// Decode an overlay from disk.
pub fn load_overlay(path: &Path) -> PostermillResult<DynamicImage> {
    image::open(path).map_err(|e| PostermillError::item(path, format!("decode failed: {e}")))
}

/// Composite `overlay` into `rect` on a copy of the base and encode the result.
///
/// With PNG output the overlay's alpha is blended over the base; with JPEG
/// output alpha is dropped and the region is overwritten.
pub fn compose(
    base: &PreparedBase,
    overlay: &DynamicImage,
    rect: PixelRect,
) -> PostermillResult<Vec<u8>> {
    let filter = resize_filter(base.format);
    let mut out = Cursor::new(Vec::new());

    match (&base.canvas, base.format) {
        (Canvas::Rgba(canvas), _) => {
            let mut result = canvas.clone();
            let resized = imageops::resize(&overlay.to_rgba8(), rect.width, rect.height, filter);
            if overlay.color().has_alpha() {
                imageops::overlay(&mut result, &resized, rect.x, rect.y);
            } else {
                imageops::replace(&mut result, &resized, rect.x, rect.y);
            }

            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
            encoder
                .write_image(
                    result.as_raw(),
                    result.width(),
                    result.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(encode_error)?;
        }
        (Canvas::Rgb(canvas), format) => {
            let mut result = canvas.clone();
            let resized = imageops::resize(&overlay.to_rgb8(), rect.width, rect.height, filter);
            imageops::replace(&mut result, &resized, rect.x, rect.y);

            let quality = format.quality().unwrap_or(postermill_model::DEFAULT_JPEG_QUALITY);
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            encoder
                .write_image(
                    result.as_raw(),
                    result.width(),
                    result.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(encode_error)?;
        }
    }

    Ok(out.into_inner())
}

fn encode_error(err: image::ImageError) -> PostermillError {
    PostermillError::Other(anyhow::anyhow!("encode failed: {err}"))
}
