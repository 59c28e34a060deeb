use facegate_config::{ConfigError, ResolvedConfig, ResolvedConfigWithSource};
use facegate_core::camera::{DeviceLocator, StreamConstraints};
use facegate_core::errors::{AppError, AppResult};
use tracing::debug;

/// Loads the resolved runtime defaults from the standard config paths.
pub fn load_runtime_defaults() -> AppResult<ResolvedConfigWithSource> {
    let loaded = facegate_config::load_resolved_config().map_err(map_config_error)?;
    match &loaded.source {
        Some(path) => debug!(path = %path.display(), "loaded configuration file"),
        None => debug!("no configuration file found; using built-in defaults"),
    }
    Ok(loaded)
}

pub fn build_locator(flag: Option<&String>, defaults: &ResolvedConfig) -> DeviceLocator {
    DeviceLocator::from_option(Some(
        flag.cloned().unwrap_or_else(|| defaults.video_device.clone()),
    ))
}

pub fn build_constraints(
    pixel_format: Option<&String>,
    width: Option<u32>,
    height: Option<u32>,
    warmup_frames: Option<u32>,
    defaults: &ResolvedConfig,
) -> StreamConstraints {
    StreamConstraints {
        pixel_format: pixel_format
            .cloned()
            .unwrap_or_else(|| defaults.pixel_format.clone()),
        width: width.unwrap_or(defaults.frame_width),
        height: height.unwrap_or(defaults.frame_height),
        warmup_frames: warmup_frames.unwrap_or(defaults.warmup_frames),
    }
}

pub fn resolve_backend_url(flag: Option<&String>, defaults: &ResolvedConfig) -> String {
    flag.cloned().unwrap_or_else(|| defaults.backend_url.clone())
}

fn map_config_error(err: ConfigError) -> AppError {
    match err {
        ConfigError::Read { path, source } => AppError::ConfigRead { path, source },
        ConfigError::Parse { path, message } => AppError::ConfigParse { path, message },
    }
}
