use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::camera::{CameraController, CapturedFrame};
use crate::encode::encode_frame;
use crate::errors::{AppError, AppResult};
use crate::workflows::backend::{RecognitionBackend, VerificationReply};
use crate::workflows::FlightGuard;

/// Generic outcome message when the exchange itself fails; raw transport
/// errors never reach the caller.
pub const VERIFICATION_FAILURE_MESSAGE: &str = "An error occurred during verification";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VerificationOutcome {
    pub success: bool,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Coordinates capture → encode → submit-for-verification against the
/// recognition backend and classifies the match decision.
pub struct VerificationWorkflow<B> {
    backend: B,
    in_flight: AtomicBool,
}

impl<B: RecognitionBackend> VerificationWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a submission exchange is outstanding. Advisory, as for
    /// enrollment.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Requires an active camera and a captured frame before any network
    /// attempt, then performs exactly one exchange. The confidence value is
    /// passed through from the backend untouched.
    pub async fn submit(
        &self,
        camera: &CameraController,
        frame: Option<&CapturedFrame>,
    ) -> AppResult<VerificationOutcome> {
        if !camera.is_active() {
            return Err(AppError::NotActive);
        }
        let frame = frame.ok_or(AppError::MissingFrame)?;
        let payload = encode_frame(frame)?;

        let _guard = FlightGuard::begin(&self.in_flight);
        match self.backend.verify(&payload).await {
            Ok(reply) => Ok(classify_reply(reply)),
            Err(err) => {
                warn!("verification exchange failed: {err}");
                Ok(VerificationOutcome {
                    success: false,
                    authenticated: false,
                    subject: None,
                    confidence: None,
                    message: Some(VERIFICATION_FAILURE_MESSAGE.into()),
                })
            }
        }
    }
}

fn classify_reply(reply: VerificationReply) -> VerificationOutcome {
    if !reply.success {
        return VerificationOutcome {
            success: false,
            authenticated: false,
            subject: None,
            confidence: None,
            message: reply.message,
        };
    }

    if reply.authenticated == Some(true) {
        VerificationOutcome {
            success: true,
            authenticated: true,
            subject: reply.user,
            confidence: reply.confidence,
            message: reply.message,
        }
    } else {
        VerificationOutcome {
            success: true,
            authenticated: false,
            subject: None,
            confidence: None,
            message: reply.message,
        }
    }
}
