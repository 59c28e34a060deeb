use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder};

use crate::camera::CapturedFrame;
use crate::errors::{AppError, AppResult};

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Fixed encoding quality (the 0.9 factor of the capture pipeline). Not
/// input-dependent, so a given frame always encodes to the same bytes.
pub const JPEG_QUALITY: u8 = 90;

/// Compressed image payload derived from one captured frame. Immutable once
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub quality: u8,
}

/// JPEG-encode a captured frame at the fixed quality, preserving its exact
/// pixel dimensions.
pub fn encode_frame(frame: &CapturedFrame) -> AppResult<EncodedPayload> {
    let expected = frame.width as usize * frame.height as usize;
    if frame.pixels.len() < expected {
        return Err(AppError::FrameProcessing(format!(
            "expected {} luma bytes for {}x{} frame, got {}",
            expected,
            frame.width,
            frame.height,
            frame.pixels.len()
        )));
    }

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .write_image(
            &frame.pixels[..expected],
            frame.width,
            frame.height,
            ColorType::L8,
        )
        .map_err(|err| AppError::ImageEncode(err.to_string()))?;

    Ok(EncodedPayload {
        bytes,
        mime_type: JPEG_MIME_TYPE.to_string(),
        quality: JPEG_QUALITY,
    })
}

/// Embed a payload as a base64 data URL, the portable still-image form.
pub fn to_data_url(payload: &EncodedPayload) -> String {
    format!(
        "data:{};base64,{}",
        payload.mime_type,
        general_purpose::STANDARD.encode(&payload.bytes)
    )
}

/// Decode a base64-embedded image back into raw upload bytes and its mime
/// type. Pure data-format conversion; round-trips what `to_data_url`
/// produced byte for byte.
pub fn to_transmittable_bytes(data_url: &str) -> AppResult<(Vec<u8>, String)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::PayloadFormat("missing data: scheme".into()))?;
    let (header, encoded) = rest
        .split_once(',')
        .ok_or_else(|| AppError::PayloadFormat("missing payload separator".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::PayloadFormat("expected a base64 embedding".into()))?;
    if mime_type.is_empty() {
        return Err(AppError::PayloadFormat("missing mime type".into()));
    }
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|err| AppError::PayloadFormat(format!("base64 decode failed: {err}")))?;
    Ok((bytes, mime_type.to_string()))
}
