//! JPEG quality adjustment.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageResult};
use tracing::warn;

use super::options::MAX_QUALITY;

/// Re-encode an image at `quality` if it is below the maximum.
///
/// Bytes that cannot be decoded are returned unchanged.
pub async fn apply_quality(bytes: Bytes, quality: u8) -> Bytes {
    if quality >= MAX_QUALITY {
        return bytes;
    }

    let original = bytes.clone();
    match tokio::task::spawn_blocking(move || reencode_jpeg(&bytes, quality)).await {
        Ok(Ok(encoded)) => Bytes::from(encoded),
        Ok(Err(e)) => {
            warn!(error = %e, quality, "Could not re-encode image, keeping original");
            original
        }
        Err(e) => {
            warn!(error = %e, "Image encoding task failed, keeping original");
            original
        }
    }
}

/// Decode any supported image and encode it as JPEG at `quality` (1..=100).
pub fn reencode_jpeg(bytes: &[u8], quality: u8) -> ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(decoded.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.clamp(1, MAX_QUALITY)))?;
    Ok(out)
}
