use facegate_core::camera::{CameraStatus, StatusSink};
use tracing::info;

/// Status sink that narrates camera transitions to the log stream; the
/// controller itself holds no opinion on presentation.
#[derive(Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn on_status(&self, status: &CameraStatus) {
        match &status.detail {
            Some(detail) => {
                info!(state = status.state.as_str(), detail = %detail, "camera status")
            }
            None => info!(state = status.state.as_str(), "camera status"),
        }
    }
}
