pub mod backend;
pub mod enrollment;
pub mod verification;

pub use backend::{EnrollmentReply, HttpBackend, RecognitionBackend, VerificationReply};
pub use enrollment::{
    validate_subject_name, EnrollmentOutcome, EnrollmentWorkflow, ENROLLMENT_FAILURE_MESSAGE,
};
pub use verification::{VerificationOutcome, VerificationWorkflow, VERIFICATION_FAILURE_MESSAGE};

use std::sync::atomic::{AtomicBool, Ordering};

/// Marks an exchange as outstanding for the lifetime of the guard. The flag
/// is advisory (cooperative single-flight), never a lock: overlapping
/// submissions still resolve independently.
pub(crate) struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    pub(crate) fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Relaxed);
        Self(flag)
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
