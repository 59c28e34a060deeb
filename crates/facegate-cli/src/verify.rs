use std::time::Duration;

use facegate_config::ResolvedConfig;
use facegate_core::camera::{
    CameraController, DeviceLocator, NoopDisplaySurface, StreamConstraints, V4lMediaSource,
};
use facegate_core::errors::AppResult;
use facegate_core::workflows::{HttpBackend, VerificationOutcome, VerificationWorkflow};

use crate::cli::VerifyArgs;
use crate::config::{build_constraints, build_locator, load_runtime_defaults, resolve_backend_url};
use crate::runtime;
use crate::status::TracingStatusSink;

pub fn run_verify_command(args: &VerifyArgs) -> AppResult<VerifyRunOutcome> {
    let defaults = load_runtime_defaults()?;
    let config = build_verify_config(args, &defaults.resolved);
    run_verify(&config)
}

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub locator: DeviceLocator,
    pub constraints: StreamConstraints,
    pub backend_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct VerifyRunOutcome {
    pub outcome: VerificationOutcome,
    pub logs: Vec<String>,
}

pub fn build_verify_config(args: &VerifyArgs, defaults: &ResolvedConfig) -> VerifyConfig {
    VerifyConfig {
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

/// Capture a face and submit it for verification. The camera stays active
/// through the exchange (the verification workflow requires a live stream)
/// and is released afterwards.
pub fn run_verify(config: &VerifyConfig) -> AppResult<VerifyRunOutcome> {
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

    let frame = match controller.capture() {
        Ok(frame) => frame,
        Err(err) => {
            controller.stop();
            return Err(err);
        }
    };
    logs.push(format!("Captured {}x{} frame", frame.width, frame.height));

    let backend = HttpBackend::with_timeout(&config.backend_url, config.timeout);
    let workflow = VerificationWorkflow::new(backend);
    let result = runtime::block_on(workflow.submit(&controller, Some(&frame)));
    controller.stop();

    let outcome = result??;
    logs.push(format!(
        "Verification exchange with {} completed",
        config.backend_url
    ));

    Ok(VerifyRunOutcome { outcome, logs })
}
