use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("camera access denied for {device}")]
    PermissionDenied { device: String },

    #[error("video device {device} unavailable: {source}")]
    DeviceUnavailable {
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("device capability error: {0}")]
    Capability(String),

    #[error("unsupported pixel format '{0}' for selected device")]
    UnsupportedFormat(String),

    #[error("camera is already active; stop it before starting again")]
    AlreadyActive,

    #[error("camera is not active")]
    NotActive,

    #[error("failed processing frame data: {0}")]
    FrameProcessing(String),

    #[error("failed to encode frame: {0}")]
    ImageEncode(String),

    #[error("malformed image payload: {0}")]
    PayloadFormat(String),

    #[error("invalid subject name: {0}")]
    InvalidSubject(String),

    #[error("no captured frame available; capture an image first")]
    MissingFrame,

    #[error("backend exchange failed: {0}")]
    Transport(String),

    #[error("backend returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("failed to write capture output {path}: {source}")]
    CaptureWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::InvalidSubject(_) => ExitCode::from(2),
            AppError::MissingFrame => ExitCode::from(2),
            AppError::UnsupportedFormat(_) => ExitCode::from(2),
            AppError::PayloadFormat(_) => ExitCode::from(2),
            AppError::Capability(_) => ExitCode::from(3),
            AppError::PermissionDenied { .. } => ExitCode::from(4),
            AppError::DeviceUnavailable { .. } => ExitCode::from(4),
            AppError::AlreadyActive => ExitCode::from(4),
            AppError::NotActive => ExitCode::from(4),
            AppError::Transport(_) => ExitCode::from(5),
            AppError::InvalidResponse(_) => ExitCode::from(5),
            AppError::ConfigRead { .. } => ExitCode::from(2),
            AppError::ConfigParse { .. } => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }

    pub fn human_message(&self) -> String {
        self.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;
