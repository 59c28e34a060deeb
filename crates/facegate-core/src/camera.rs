pub mod source;

use std::path::PathBuf;

use tracing::debug;

use crate::errors::{AppError, AppResult};

pub use source::{MediaSource, MediaSourceFactory, V4lMediaSource};

#[derive(Debug, Clone)]
pub enum DeviceLocator {
    Index(u32),
    Path(PathBuf),
}

impl DeviceLocator {
    pub fn from_option(device: Option<String>) -> Self {
        match device {
            Some(text) => {
                if let Ok(index) = text.parse::<u32>() {
                    DeviceLocator::Index(index)
                } else {
                    DeviceLocator::Path(PathBuf::from(text))
                }
            }
            None => DeviceLocator::Index(0),
        }
    }

    pub fn display(&self) -> String {
        match self {
            DeviceLocator::Index(i) => format!("/dev/video{i}"),
            DeviceLocator::Path(path) => path.display().to_string(),
        }
    }
}

/// Requested stream parameters. Width and height are ideals; the driver's
/// counter-offer wins and `capture` always uses the negotiated size.
#[derive(Debug, Clone)]
pub struct StreamConstraints {
    pub pixel_format: String,
    pub width: u32,
    pub height: u32,
    pub warmup_frames: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            pixel_format: "YUYV".into(),
            width: 640,
            height: 480,
            warmup_frames: 0,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub pixel_format: String,
    pub width: u32,
    pub height: u32,
}

/// One raster snapshot of the live stream, sized to the negotiated
/// dimensions. 8-bit luma, row-major. Consumed by the encoder; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Inactive,
    Active,
    Error,
}

impl CameraState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraState::Inactive => "inactive",
            CameraState::Active => "active",
            CameraState::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraStatus {
    pub state: CameraState,
    pub detail: Option<String>,
}

/// Receives every controller transition. The controller holds no opinion on
/// presentation; the CLI installs a tracing-backed sink.
pub trait StatusSink: Send + Sync {
    fn on_status(&self, status: &CameraStatus);
}

/// Preview collaborator. Bound to the live stream on `start`, cleared on
/// `stop`; never touched while no stream is held.
pub trait DisplaySurface: Send + Sync {
    fn bind(&self, format: &NegotiatedFormat);
    fn clear(&self);
}

#[derive(Default, Clone, Copy)]
pub struct NoopStatusSink;

impl StatusSink for NoopStatusSink {
    fn on_status(&self, _status: &CameraStatus) {}
}

#[derive(Default, Clone, Copy)]
pub struct NoopDisplaySurface;

impl DisplaySurface for NoopDisplaySurface {
    fn bind(&self, _format: &NegotiatedFormat) {}
    fn clear(&self) {}
}

/// Exclusively owned handle to the live stream. Exists iff the controller is
/// active; dropping it releases the hardware device.
pub struct CameraSession {
    source: Box<dyn MediaSource>,
    format: NegotiatedFormat,
}

impl CameraSession {
    pub fn format(&self) -> &NegotiatedFormat {
        &self.format
    }
}

pub struct CameraController {
    locator: DeviceLocator,
    constraints: StreamConstraints,
    factory: Box<MediaSourceFactory>,
    sink: Box<dyn StatusSink>,
    display: Box<dyn DisplaySurface>,
    session: Option<CameraSession>,
    state: CameraState,
    last_error: Option<String>,
}

impl CameraController {
    pub fn new(locator: DeviceLocator, constraints: StreamConstraints) -> Self {
        Self::with_parts(
            locator,
            constraints,
            Box::new(V4lMediaSource::open),
            Box::new(NoopStatusSink),
            Box::new(NoopDisplaySurface),
        )
    }

    pub fn with_parts(
        locator: DeviceLocator,
        constraints: StreamConstraints,
        factory: Box<MediaSourceFactory>,
        sink: Box<dyn StatusSink>,
        display: Box<dyn DisplaySurface>,
    ) -> Self {
        Self {
            locator,
            constraints,
            factory,
            sink,
            display,
            session: None,
            state: CameraState::Inactive,
            last_error: None,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session(&self) -> Option<&CameraSession> {
        self.session.as_ref()
    }

    /// Acquire the stream. A second `start` without an intervening `stop` is
    /// rejected; the controller never implicitly restarts.
    pub fn start(&mut self) -> AppResult<()> {
        if self.session.is_some() {
            return Err(AppError::AlreadyActive);
        }

        match (self.factory)(&self.locator, &self.constraints) {
            Ok(source) => {
                let format = source.format().clone();
                debug!(
                    device = %self.locator.display(),
                    pixel_format = %format.pixel_format,
                    width = format.width,
                    height = format.height,
                    "camera stream acquired"
                );
                self.display.bind(&format);
                self.session = Some(CameraSession { source, format });
                self.state = CameraState::Active;
                self.last_error = None;
                self.emit(None);
                Ok(())
            }
            Err(err) => {
                let detail = err.human_message();
                self.state = CameraState::Error;
                self.last_error = Some(detail.clone());
                self.emit(Some(detail));
                Err(err)
            }
        }
    }

    /// Release the stream and clear the preview. No-op when no stream is
    /// bound; idempotent.
    pub fn stop(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        debug!(device = %self.locator.display(), "camera stream released");
        self.display.clear();
        self.state = CameraState::Inactive;
        self.emit(None);
    }

    /// Read one frame at the negotiated native dimensions. Valid only while
    /// active; never touches the display surface.
    pub fn capture(&mut self) -> AppResult<CapturedFrame> {
        let session = self.session.as_mut().ok_or(AppError::NotActive)?;
        session.source.read_frame()
    }

    fn emit(&self, detail: Option<String>) {
        self.sink.on_status(&CameraStatus {
            state: self.state,
            detail,
        });
    }
}
