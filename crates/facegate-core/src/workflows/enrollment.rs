use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::camera::CapturedFrame;
use crate::encode::encode_frame;
use crate::errors::{AppError, AppResult};
use crate::workflows::backend::RecognitionBackend;
use crate::workflows::FlightGuard;

/// Generic outcome message when the exchange itself fails; raw transport
/// errors never reach the caller.
pub const ENROLLMENT_FAILURE_MESSAGE: &str = "An error occurred during enrollment";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub success: bool,
    pub message: String,
}

/// Coordinates capture → encode → submit-for-enrollment against the
/// recognition backend. One network exchange per submission, no retries.
pub struct EnrollmentWorkflow<B> {
    backend: B,
    in_flight: AtomicBool,
}

impl<B: RecognitionBackend> EnrollmentWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a submission exchange is outstanding. Advisory: callers
    /// use it to disable duplicate submissions, but overlapping calls still
    /// resolve independently.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Validates locally (trimmed non-empty name, frame present) before any
    /// network attempt, then performs exactly one exchange. Transport
    /// failures resolve as a failed outcome rather than an error.
    pub async fn submit(
        &self,
        name: &str,
        frame: Option<&CapturedFrame>,
    ) -> AppResult<EnrollmentOutcome> {
        let subject = validate_subject_name(name)?;
        let frame = frame.ok_or(AppError::MissingFrame)?;
        let payload = encode_frame(frame)?;

        let _guard = FlightGuard::begin(&self.in_flight);
        match self.backend.enroll(&subject, &payload).await {
            Ok(reply) => Ok(EnrollmentOutcome {
                success: reply.success,
                message: reply.message,
            }),
            Err(err) => {
                warn!("enrollment exchange failed: {err}");
                Ok(EnrollmentOutcome {
                    success: false,
                    message: ENROLLMENT_FAILURE_MESSAGE.into(),
                })
            }
        }
    }
}

pub fn validate_subject_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidSubject(
            "subject name cannot be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}
