use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use facegate_cli::capture::{CaptureHandler, CaptureOutcome, CaptureSummary};
use facegate_cli::cli::{CaptureArgs, OutputMode};
use facegate_cli::commands::CommandHandler;
use facegate_config::{ResolvedConfig, ResolvedConfigWithSource};
use facegate_core::camera::NegotiatedFormat;
use facegate_core::errors::AppError;

fn sample_args() -> CaptureArgs {
    CaptureArgs {
        device: None,
        pixel_format: None,
        width: None,
        height: None,
        warmup_frames: None,
        output: None,
    }
}

fn sample_defaults() -> ResolvedConfigWithSource {
    ResolvedConfigWithSource {
        resolved: ResolvedConfig::default(),
        source: None,
    }
}

fn sample_outcome() -> CaptureOutcome {
    CaptureOutcome {
        summary: CaptureSummary {
            success: true,
            output_path: "captures/test.jpg".into(),
            format: NegotiatedFormat {
                pixel_format: "YUYV".into(),
                width: 640,
                height: 480,
            },
            mime_type: "image/jpeg".into(),
            quality: 90,
        },
        logs: vec![],
    }
}

#[test]
fn capture_handler_renders_successful_capture() {
    let render_invocations = Arc::new(Mutex::new(Vec::new()));
    let handler = CaptureHandler::with_dependencies(
        sample_args(),
        || Ok(sample_defaults()),
        |_config| Ok(sample_outcome()),
        {
            let render_invocations = Arc::clone(&render_invocations);
            move |outcome, mode| {
                render_invocations.lock().unwrap().push((
                    outcome.summary.output_path.clone(),
                    matches!(mode, OutputMode::Json),
                ));
                Ok(())
            }
        },
    );

    let exit = handler.execute(OutputMode::Human, false).unwrap();
    assert_eq!(exit, ExitCode::SUCCESS);
    let calls = render_invocations.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "captures/test.jpg");
}

#[test]
fn capture_handler_propagates_runner_errors() {
    let handler = CaptureHandler::with_dependencies(
        sample_args(),
        || Ok(sample_defaults()),
        |_config| Err(AppError::Capability("boom".into())),
        |_outcome, _mode| Ok(()),
    );

    let err = handler.execute(OutputMode::Json, false).unwrap_err();
    match err {
        AppError::Capability(message) => assert_eq!(message, "boom"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn capture_handler_forwards_config_defaults_to_runner() {
    let seen_devices = Arc::new(Mutex::new(Vec::new()));
    let handler = CaptureHandler::with_dependencies(
        sample_args(),
        || {
            let mut defaults = sample_defaults();
            defaults.resolved.video_device = "/dev/video7".into();
            Ok(defaults)
        },
        {
            let seen_devices = Arc::clone(&seen_devices);
            move |config| {
                seen_devices.lock().unwrap().push(config.locator.display());
                Ok(sample_outcome())
            }
        },
        |_outcome, _mode| Ok(()),
    );

    handler.execute(OutputMode::Human, false).unwrap();
    assert_eq!(seen_devices.lock().unwrap().as_slice(), ["/dev/video7"]);
}
