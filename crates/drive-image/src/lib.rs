//! Camera frame decoding for the drive bridge.
//!
//! The simulator ships each camera frame as base64 text wrapping an encoded
//! image (JPEG in practice). This crate turns that text into an RGB
//! `Tensor<u8>` in HWC layout: `[height, width, 3]`.

pub mod error;

pub use error::ImageError;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crates_image::ImageEncoder;
use drive_base::Tensor;

/// Decodes base64 text into the raw bytes it carries.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, ImageError> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Encodes raw bytes as standard (padded) base64 text.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes an encoded image into an RGB frame.
///
/// The format is auto-detected. Grayscale, alpha and 16-bit images are
/// converted to 8-bit RGB so the result always has 3 channels.
pub fn decode_frame(data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    let rgb = crates_image::load_from_memory(data)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Tensor::new(
        vec![height as usize, width as usize, 3],
        rgb.into_raw(),
    )?)
}

/// Decodes a base64 image payload into an RGB frame.
///
/// The CPU-bound decoding work runs on tokio's blocking thread pool.
///
/// # Errors
///
/// Returns `ImageError::Base64` if the text is not valid base64 and
/// `ImageError::Decode` if the bytes are not a supported image.
pub async fn decode_frame_base64(text: &str) -> Result<Tensor<u8>, ImageError> {
    let owned = text.to_owned();
    tokio::task::spawn_blocking(move || decode_frame(&decode_base64(&owned)?))
        .await
        .map_err(|e| ImageError::Decode(e.to_string()))?
}

/// Encodes an RGB frame as JPEG bytes.
///
/// The `quality` parameter controls JPEG compression (1-100, higher = better quality).
pub fn encode_jpeg(frame: &Tensor<u8>, quality: u8) -> Result<Vec<u8>, ImageError> {
    let (height, width, channels) = frame
        .hwc()
        .ok_or_else(|| ImageError::Encode(format!("expected [H, W, 3], got {:?}", frame.shape)))?;
    if channels != 3 {
        return Err(ImageError::Encode(format!(
            "unsupported channel count: {channels}"
        )));
    }

    let mut buffer = Vec::new();
    crates_image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &frame.data,
            width as u32,
            height as u32,
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}
