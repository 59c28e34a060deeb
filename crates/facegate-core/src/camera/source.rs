use std::io;

use tracing::debug;
use v4l::buffer::Type;
use v4l::capability::{Capabilities, Flags as CapabilityFlags};
use v4l::format::FourCC;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;

use crate::camera::{CapturedFrame, DeviceLocator, NegotiatedFormat, StreamConstraints};
use crate::errors::{AppError, AppResult};

/// Live stream handle. One frame read per `capture`; dropping the source
/// releases the underlying device.
pub trait MediaSource: Send {
    fn format(&self) -> &NegotiatedFormat;
    fn read_frame(&mut self) -> AppResult<CapturedFrame>;
}

pub type MediaSourceFactory =
    dyn Fn(&DeviceLocator, &StreamConstraints) -> AppResult<Box<dyn MediaSource>> + Send + Sync;

pub struct V4lMediaSource {
    device: v4l::Device,
    negotiated: NegotiatedFormat,
    warmup_frames: u32,
}

impl V4lMediaSource {
    pub fn open(
        locator: &DeviceLocator,
        constraints: &StreamConstraints,
    ) -> AppResult<Box<dyn MediaSource>> {
        let device = open_device(locator)?;
        let caps = device.query_caps()?;
        ensure_capabilities(&caps)?;

        let requested_fourcc = parse_fourcc(&constraints.pixel_format)
            .map_err(|_| AppError::UnsupportedFormat(constraints.pixel_format.clone()))?;

        let mut format = device.format()?;
        format.fourcc = requested_fourcc;
        format.width = constraints.width;
        format.height = constraints.height;
        let format = device.set_format(&format)?;
        if format.fourcc != requested_fourcc {
            return Err(AppError::UnsupportedFormat(constraints.pixel_format.clone()));
        }

        let negotiated = NegotiatedFormat {
            pixel_format: fourcc_to_string(format.fourcc),
            width: format.width,
            height: format.height,
        };
        debug!(
            device = %locator.display(),
            driver = %caps.driver,
            pixel_format = %negotiated.pixel_format,
            width = negotiated.width,
            height = negotiated.height,
            "negotiated video format"
        );

        Ok(Box::new(Self {
            device,
            negotiated,
            warmup_frames: constraints.warmup_frames,
        }))
    }
}

impl MediaSource for V4lMediaSource {
    fn format(&self) -> &NegotiatedFormat {
        &self.negotiated
    }

    fn read_frame(&mut self) -> AppResult<CapturedFrame> {
        let mut stream = Stream::with_buffers(&self.device, Type::VideoCapture, 4)?;
        for idx in 0..self.warmup_frames {
            stream.next().map_err(|err| {
                AppError::FrameProcessing(format!(
                    "failed to read warm-up frame {}: {}",
                    idx + 1,
                    err
                ))
            })?;
        }
        let (data, _) = stream.next()?;
        convert_frame_to_luma(data, &self.negotiated)
    }
}

fn open_device(locator: &DeviceLocator) -> AppResult<v4l::Device> {
    let opened = match locator {
        DeviceLocator::Index(index) => v4l::Device::new(*index as usize),
        DeviceLocator::Path(path) => v4l::Device::with_path(path),
    };
    opened.map_err(|err| classify_open_error(locator.display(), err))
}

pub(crate) fn classify_open_error(device: String, err: io::Error) -> AppError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        AppError::PermissionDenied { device }
    } else {
        AppError::DeviceUnavailable {
            device,
            source: err,
        }
    }
}

fn ensure_capabilities(caps: &Capabilities) -> AppResult<()> {
    let flags = caps.capabilities;
    let mut reasons = Vec::new();
    if !flags.contains(CapabilityFlags::VIDEO_CAPTURE) {
        reasons.push("missing VIDEO_CAPTURE".to_string());
    }
    if !flags.intersects(CapabilityFlags::READ_WRITE | CapabilityFlags::STREAMING) {
        reasons.push("missing READ_WRITE or STREAMING".to_string());
    }
    if reasons.is_empty() {
        Ok(())
    } else {
        Err(AppError::Capability(reasons.join(", ")))
    }
}

/// Converts raw frame bytes to an 8-bit luma raster at the negotiated
/// dimensions. Capture never scales or crops.
pub fn convert_frame_to_luma(data: &[u8], format: &NegotiatedFormat) -> AppResult<CapturedFrame> {
    let width = format.width as usize;
    let height = format.height as usize;
    let expected_pixels = width * height;

    let pixels = match format.pixel_format.as_str() {
        "Y16" => {
            if data.len() < expected_pixels * 2 {
                return Err(AppError::FrameProcessing(format!(
                    "expected {} bytes for Y16 frame, got {}",
                    expected_pixels * 2,
                    data.len()
                )));
            }
            let mut buffer = Vec::with_capacity(expected_pixels);
            for idx in 0..expected_pixels {
                let low = data[idx * 2] as u16;
                let high = data[idx * 2 + 1] as u16;
                let value = (high << 8) | low;
                buffer.push((value >> 8) as u8);
            }
            buffer
        }
        "GREY" | "Y08" => {
            if data.len() < expected_pixels {
                return Err(AppError::FrameProcessing(format!(
                    "expected {} bytes for {} frame, got {}",
                    expected_pixels,
                    format.pixel_format,
                    data.len()
                )));
            }
            data[..expected_pixels].to_vec()
        }
        "YUYV" => {
            let expected_bytes = expected_pixels * 2;
            if data.len() < expected_bytes {
                return Err(AppError::FrameProcessing(format!(
                    "expected {} bytes for YUYV frame, got {}",
                    expected_bytes,
                    data.len()
                )));
            }

            let mut buffer = Vec::with_capacity(expected_pixels);
            let mut chunks = data[..expected_bytes].chunks_exact(4);
            for chunk in &mut chunks {
                buffer.push(chunk[0]);
                if buffer.len() == expected_pixels {
                    break;
                }
                buffer.push(chunk[2]);
            }

            let remainder = chunks.remainder();
            if !remainder.is_empty() {
                return Err(AppError::FrameProcessing(
                    "incomplete YUYV macro-pixel encountered".into(),
                ));
            }
            buffer
        }
        other => {
            return Err(AppError::FrameProcessing(format!(
                "unsupported conversion from pixel format {other}"
            )))
        }
    };

    Ok(CapturedFrame {
        width: format.width,
        height: format.height,
        pixels,
    })
}

fn parse_fourcc(code: &str) -> Result<FourCC, ()> {
    if code.is_empty() || code.len() > 4 {
        return Err(());
    }
    let mut repr = [b' '; 4];
    for (i, byte) in code.as_bytes().iter().enumerate() {
        repr[i] = *byte;
    }
    Ok(FourCC::new(&repr))
}

fn fourcc_to_string(fourcc: FourCC) -> String {
    String::from_utf8_lossy(&fourcc.repr)
        .trim_matches(|c| c == char::from(0) || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_format(width: u32, height: u32, pixel_format: &str) -> NegotiatedFormat {
        NegotiatedFormat {
            pixel_format: pixel_format.into(),
            width,
            height,
        }
    }

    #[test]
    fn convert_y16_scales_to_luma() {
        let format = grey_format(2, 2, "Y16");
        let data: Vec<u8> = vec![0, 0, 0, 0, 255, 255, 255, 255];
        let frame = convert_frame_to_luma(&data, &format).expect("convert y16");
        assert_eq!(frame.width, 2);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.pixels, vec![0, 0, 255, 255]);
    }

    #[test]
    fn convert_grey_is_passthrough() {
        let format = grey_format(2, 2, "GREY");
        let data: Vec<u8> = vec![10, 20, 30, 40];
        let frame = convert_frame_to_luma(&data, &format).expect("convert grey");
        assert_eq!(frame.pixels, data);
    }

    #[test]
    fn convert_yuyv_drops_chroma() {
        let format = grey_format(2, 2, "YUYV");
        let data: Vec<u8> = vec![10, 128, 20, 128, 30, 64, 40, 64];
        let frame = convert_frame_to_luma(&data, &format).expect("convert yuyv");
        assert_eq!(frame.width, 2);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.pixels, vec![10, 20, 30, 40]);
    }

    #[test]
    fn convert_rejects_short_buffers() {
        let format = grey_format(4, 4, "GREY");
        let err = convert_frame_to_luma(&[0, 1, 2], &format).unwrap_err();
        assert!(matches!(err, AppError::FrameProcessing(_)));
    }

    #[test]
    fn convert_rejects_unknown_formats() {
        let format = grey_format(2, 2, "MJPG");
        let err = convert_frame_to_luma(&[0; 8], &format).unwrap_err();
        assert!(matches!(err, AppError::FrameProcessing(_)));
    }

    #[test]
    fn fourcc_parse_round_trips() {
        let fourcc = parse_fourcc("YUYV").unwrap();
        assert_eq!(fourcc_to_string(fourcc), "YUYV");
        assert!(parse_fourcc("").is_err());
        assert!(parse_fourcc("TOOLONG").is_err());
    }
}
