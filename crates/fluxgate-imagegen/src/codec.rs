//! Image transport encoding and adaptive payload sizing
//!
//! Everything that leaves the server as an image content item passes
//! through here: files are normalized to PNG, and payloads that would
//! blow the transport budget are scaled down in a single pass.

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::{ImageGenError, Result};
use crate::types::EncodedPayload;

/// Default transport budget for a single image payload, in
/// text-encoded bytes
pub const DEFAULT_PAYLOAD_BUDGET: usize = 750_000;

/// Read an image file and normalize it to a PNG payload
///
/// Whatever the source format, the returned payload is PNG-encoded.
pub fn read_and_encode(path: &Path) -> Result<EncodedPayload> {
    let raw = std::fs::read(path)?;

    let image = image::load_from_memory(&raw)
        .map_err(|e| ImageGenError::Transient(format!("failed to decode {}: {e}", path.display())))?;

    encode_png(&image)
}

/// Scale a payload down so its text-encoded size fits the budget
///
/// Returns the payload unchanged when it already fits. Otherwise both
/// raster dimensions are scaled by `sqrt(budget / current)` — byte
/// count tracks pixel area for a fixed format — and the image is
/// re-encoded after a Lanczos resample.
///
/// This is a single-pass estimate, not an iterative fit: PNG
/// compression varies with content, so the result can still slightly
/// exceed the budget for highly compressible images.
pub fn fit_to_budget(payload: EncodedPayload, budget_bytes: usize) -> Result<EncodedPayload> {
    let current = payload.encoded_size();
    if current <= budget_bytes {
        return Ok(payload);
    }

    let image = image::load_from_memory(payload.bytes())
        .map_err(|e| ImageGenError::Transient(format!("failed to decode payload: {e}")))?;

    let scale = (budget_bytes as f64 / current as f64).sqrt();
    let width = scale_dimension(image.width(), scale);
    let height = scale_dimension(image.height(), scale);

    tracing::debug!(
        encoded_size = current,
        budget = budget_bytes,
        width,
        height,
        "resizing image to fit payload budget"
    );

    let resized = image.resize_exact(width, height, FilterType::Lanczos3);
    encode_png(&resized)
}

/// PNG-encode a decoded image into a transport payload
fn encode_png(image: &DynamicImage) -> Result<EncodedPayload> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ImageGenError::Transient(format!("failed to encode PNG: {e}")))?;
    Ok(EncodedPayload::from_png_bytes(bytes))
}

/// Scale one dimension, never collapsing below a single pixel
fn scale_dimension(dimension: u32, scale: f64) -> u32 {
    let scaled = (f64::from(dimension) * scale).round() as u32;
    scaled.max(1)
}
