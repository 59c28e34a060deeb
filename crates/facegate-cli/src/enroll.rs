use std::time::Duration;

use facegate_config::ResolvedConfig;
use facegate_core::camera::{
    CameraController, DeviceLocator, NoopDisplaySurface, StreamConstraints, V4lMediaSource,
};
use facegate_core::errors::AppResult;
use facegate_core::workflows::{
    validate_subject_name, EnrollmentOutcome, EnrollmentWorkflow, HttpBackend,
};

use crate::cli::EnrollArgs;
use crate::config::{build_constraints, build_locator, load_runtime_defaults, resolve_backend_url};
use crate::runtime;
use crate::status::TracingStatusSink;

pub fn run_enroll_command(args: &EnrollArgs) -> AppResult<EnrollRunOutcome> {
    let defaults = load_runtime_defaults()?;
    let config = build_enroll_config(args, &defaults.resolved);
    run_enroll(&config)
}

#[derive(Debug, Clone)]
pub struct EnrollConfig {
    pub subject: String,
    pub locator: DeviceLocator,
    pub constraints: StreamConstraints,
    pub backend_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct EnrollRunOutcome {
    pub subject: String,
    pub outcome: EnrollmentOutcome,
    pub logs: Vec<String>,
}

pub fn build_enroll_config(args: &EnrollArgs, defaults: &ResolvedConfig) -> EnrollConfig {
    EnrollConfig {
        subject: args.name.clone(),
        locator: build_locator(args.device.as_ref(), defaults),
        constraints: build_constraints(
            args.pixel_format.as_ref(),
            None,
            None,
            args.warmup_frames,
            defaults,
        ),
        backend_url: resolve_backend_url(args.backend_url.as_ref(), defaults),
        timeout: defaults.request_timeout,
    }
}

/// Capture a face and submit it for enrollment. The subject name is
/// validated before the camera is touched; the device is released before
/// the network exchange (the enrollment workflow does not need a live
/// stream once the still is taken).
pub fn run_enroll(config: &EnrollConfig) -> AppResult<EnrollRunOutcome> {
    let subject = validate_subject_name(&config.subject)?;

    let mut logs = Vec::new();
    let mut controller = CameraController::with_parts(
        config.locator.clone(),
        config.constraints.clone(),
        Box::new(V4lMediaSource::open),
        Box::new(TracingStatusSink),
        Box::new(NoopDisplaySurface),
    );

    controller.start()?;
    logs.push(format!("Camera active on {}", config.locator.display()));
    let captured = controller.capture();
    controller.stop();
    let frame = captured?;
    logs.push(format!("Captured {}x{} frame", frame.width, frame.height));

    let backend = HttpBackend::with_timeout(&config.backend_url, config.timeout);
    let workflow = EnrollmentWorkflow::new(backend);
    let outcome = runtime::block_on(workflow.submit(&subject, Some(&frame)))??;
    logs.push(format!(
        "Enrollment exchange with {} completed",
        config.backend_url
    ));

    Ok(EnrollRunOutcome {
        subject,
        outcome,
        logs,
    })
}
