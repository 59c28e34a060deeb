pub mod camera;
pub mod encode;
pub mod errors;
pub mod workflows;

pub use camera::{
    CameraController, CameraSession, CameraState, CameraStatus, CapturedFrame, DeviceLocator,
    DisplaySurface, NegotiatedFormat, StatusSink, StreamConstraints,
};
pub use encode::{encode_frame, to_data_url, to_transmittable_bytes, EncodedPayload};
pub use errors::{AppError, AppResult};
