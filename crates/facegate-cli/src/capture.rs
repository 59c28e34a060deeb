use std::any::Any;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;

use facegate_config::{ResolvedConfig, ResolvedConfigWithSource};
use facegate_core::camera::{
    CameraController, DeviceLocator, NegotiatedFormat, NoopDisplaySurface, StreamConstraints,
    V4lMediaSource,
};
use facegate_core::encode::encode_frame;
use facegate_core::errors::{AppError, AppResult};

use crate::cli::{CaptureArgs, OutputMode};
use crate::commands::CommandHandler;
use crate::config::{build_constraints, build_locator, load_runtime_defaults};
use crate::output::render_capture;
use crate::status::TracingStatusSink;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub locator: DeviceLocator,
    pub constraints: StreamConstraints,
    pub output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
pub struct CaptureSummary {
    pub success: bool,
    pub output_path: String,
    pub format: NegotiatedFormat,
    pub mime_type: String,
    pub quality: u8,
}

#[derive(Debug)]
pub struct CaptureOutcome {
    pub summary: CaptureSummary,
    pub logs: Vec<String>,
}

pub fn build_capture_config(args: &CaptureArgs, defaults: &ResolvedConfig) -> CaptureConfig {
    CaptureConfig {
        locator: build_locator(args.device.as_ref(), defaults),
        constraints: build_constraints(
            args.pixel_format.as_ref(),
            args.width,
            args.height,
            args.warmup_frames,
            defaults,
        ),
        output: args.output.clone(),
    }
}

/// Start the camera, capture one still, encode it, and write the JPEG to
/// the requested path. The device is released before returning.
pub fn run_capture(config: &CaptureConfig) -> AppResult<CaptureOutcome> {
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
    let format = controller.session().map(|session| session.format().clone());
    controller.stop();

    let frame = captured?;
    let format = format.ok_or(AppError::NotActive)?;
    logs.push(format!(
        "Captured {}x{} frame ({})",
        frame.width, frame.height, format.pixel_format
    ));

    let payload = encode_frame(&frame)?;
    let output_path = ensure_output_path(config.output.as_ref())?;
    fs::write(&output_path, &payload.bytes).map_err(|err| AppError::CaptureWrite {
        path: output_path.clone(),
        source: err,
    })?;
    logs.push(format!("Saved frame to {}", output_path.display()));

    Ok(CaptureOutcome {
        summary: CaptureSummary {
            success: true,
            output_path: output_path.display().to_string(),
            format,
            mime_type: payload.mime_type,
            quality: payload.quality,
        },
        logs,
    })
}

fn ensure_output_path(requested: Option<&PathBuf>) -> AppResult<PathBuf> {
    match requested {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Ok(path.clone())
        }
        None => {
            let dir = PathBuf::from("captures");
            fs::create_dir_all(&dir)?;
            let stamp = Utc::now().format("%Y%m%d-%H%M%S");
            Ok(dir.join(format!("{stamp}.jpg")))
        }
    }
}

pub struct CaptureHandler {
    args: CaptureArgs,
    load_defaults: Box<dyn Fn() -> AppResult<ResolvedConfigWithSource> + Send + Sync>,
    run: Box<dyn Fn(&CaptureConfig) -> AppResult<CaptureOutcome> + Send + Sync>,
    render: Box<dyn Fn(&CaptureOutcome, OutputMode) -> AppResult<()> + Send + Sync>,
}

impl CaptureHandler {
    pub fn new(args: CaptureArgs) -> Self {
        Self::with_dependencies(args, load_runtime_defaults, run_capture, render_capture)
    }

    pub fn with_dependencies(
        args: CaptureArgs,
        load_defaults: impl Fn() -> AppResult<ResolvedConfigWithSource> + Send + Sync + 'static,
        run: impl Fn(&CaptureConfig) -> AppResult<CaptureOutcome> + Send + Sync + 'static,
        render: impl Fn(&CaptureOutcome, OutputMode) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            load_defaults: Box::new(load_defaults),
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for CaptureHandler {
    fn execute(&self, mode: OutputMode, _verbose: bool) -> AppResult<ExitCode> {
        let defaults = (self.load_defaults)()?;
        let config = build_capture_config(&self.args, &defaults.resolved);
        let outcome = (self.run)(&config)?;
        (self.render)(&outcome, mode)?;
        Ok(ExitCode::SUCCESS)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
