use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use facegate_core::camera::{
    CameraController, CapturedFrame, DeviceLocator, MediaSource, MediaSourceFactory,
    NegotiatedFormat, StreamConstraints,
};
use facegate_core::camera::{NoopDisplaySurface, NoopStatusSink};
use facegate_core::encode::EncodedPayload;
use facegate_core::errors::{AppError, AppResult};
use facegate_core::workflows::{
    EnrollmentReply, EnrollmentWorkflow, RecognitionBackend, VerificationReply,
    VerificationWorkflow,
};

struct StaticSource(NegotiatedFormat);

impl MediaSource for StaticSource {
    fn format(&self) -> &NegotiatedFormat {
        &self.0
    }

    fn read_frame(&mut self) -> AppResult<CapturedFrame> {
        Ok(CapturedFrame {
            width: self.0.width,
            height: self.0.height,
            pixels: vec![128; (self.0.width * self.0.height) as usize],
        })
    }
}

fn granted_factory() -> Box<MediaSourceFactory> {
    Box::new(|_locator, _constraints| {
        Ok(Box::new(StaticSource(NegotiatedFormat {
            pixel_format: "GREY".into(),
            width: 640,
            height: 480,
        })))
    })
}

fn camera() -> CameraController {
    CameraController::with_parts(
        DeviceLocator::Index(0),
        StreamConstraints::default(),
        granted_factory(),
        Box::new(NoopStatusSink),
        Box::new(NoopDisplaySurface),
    )
}

#[derive(Default)]
struct ScriptedBackend {
    enroll_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    enroll_reply: Mutex<Option<AppResult<EnrollmentReply>>>,
    verify_reply: Mutex<Option<AppResult<VerificationReply>>>,
}

impl RecognitionBackend for &ScriptedBackend {
    async fn enroll(&self, _subject: &str, payload: &EncodedPayload) -> AppResult<EnrollmentReply> {
        assert_eq!(payload.mime_type, "image/jpeg");
        assert!(!payload.bytes.is_empty());
        self.enroll_calls.fetch_add(1, Ordering::SeqCst);
        self.enroll_reply
            .lock()
            .unwrap()
            .take()
            .expect("unexpected enroll call")
    }

    async fn verify(&self, payload: &EncodedPayload) -> AppResult<VerificationReply> {
        assert_eq!(payload.mime_type, "image/jpeg");
        assert!(!payload.bytes.is_empty());
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_reply
            .lock()
            .unwrap()
            .take()
            .expect("unexpected verify call")
    }
}

#[tokio::test]
async fn verification_round_trip_with_matched_identity() {
    let mut camera = camera();
    camera.start().unwrap();
    let frame = camera.capture().unwrap();
    assert_eq!(frame.width, 640);
    assert_eq!(frame.height, 480);

    let backend = ScriptedBackend::default();
    *backend.verify_reply.lock().unwrap() = Some(Ok(VerificationReply {
        success: true,
        authenticated: Some(true),
        user: Some("Alice".into()),
        confidence: Some(0.93),
        message: None,
    }));

    let workflow = VerificationWorkflow::new(&backend);
    let outcome = workflow.submit(&camera, Some(&frame)).await.unwrap();

    assert!(outcome.success);
    assert!(outcome.authenticated);
    assert_eq!(outcome.subject.as_deref(), Some("Alice"));
    assert_eq!(outcome.confidence, Some(0.93));
    assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn verification_round_trip_without_match() {
    let mut camera = camera();
    camera.start().unwrap();
    let frame = camera.capture().unwrap();

    let backend = ScriptedBackend::default();
    *backend.verify_reply.lock().unwrap() = Some(Ok(VerificationReply {
        success: true,
        authenticated: Some(false),
        user: None,
        confidence: None,
        message: None,
    }));

    let workflow = VerificationWorkflow::new(&backend);
    let outcome = workflow.submit(&camera, Some(&frame)).await.unwrap();

    assert!(outcome.success);
    assert!(!outcome.authenticated);
    assert!(outcome.subject.is_none());
}

#[tokio::test]
async fn enrollment_round_trip() {
    let mut camera = camera();
    camera.start().unwrap();
    let frame = camera.capture().unwrap();

    let backend = ScriptedBackend::default();
    *backend.enroll_reply.lock().unwrap() = Some(Ok(EnrollmentReply {
        success: true,
        message: "Enrolled Bob".into(),
    }));

    let workflow = EnrollmentWorkflow::new(&backend);
    let outcome = workflow.submit("Bob", Some(&frame)).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, "Enrolled Bob");
    assert_eq!(backend.enroll_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn verification_requires_active_camera() {
    let mut camera = camera();
    camera.start().unwrap();
    let frame = camera.capture().unwrap();
    camera.stop();

    let backend = ScriptedBackend::default();
    let workflow = VerificationWorkflow::new(&backend);

    let err = workflow.submit(&camera, Some(&frame)).await.unwrap_err();
    assert!(matches!(err, AppError::NotActive));
    assert_eq!(backend.verify_calls.load(Ordering::SeqCst), 0);
}
