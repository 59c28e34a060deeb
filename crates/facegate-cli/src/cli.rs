use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "facegate",
    about = "Enroll and verify identities by face against a recognition backend",
    version
)]
pub struct Cli {
    /// Emit structured JSON to stdout instead of human-readable logs
    #[arg(long)]
    pub json: bool,

    /// Increase verbosity (may be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Capture a single frame from the camera and save it as a JPEG still
    Capture(CaptureArgs),
    /// Capture a face and enroll it under a subject name
    Enroll(EnrollArgs),
    /// Capture a face and verify it against enrolled identities
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Video device path (e.g. /dev/video2) or index (e.g. 0)
    #[arg(long)]
    pub device: Option<String>,

    /// Requested pixel format FourCC (e.g. YUYV, GREY)
    #[arg(long)]
    pub pixel_format: Option<String>,

    /// Ideal frame width (the driver's counter-offer wins)
    #[arg(long)]
    pub width: Option<u32>,

    /// Ideal frame height (the driver's counter-offer wins)
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of warm-up frames to discard before the capture
    #[arg(long)]
    pub warmup_frames: Option<u32>,

    /// Optional output file path (defaults to captures/<timestamp>.jpg)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EnrollArgs {
    /// Subject name to enroll the captured face under
    #[arg(long)]
    pub name: String,

    /// Recognition backend base URL (overrides the config file)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Video device path (e.g. /dev/video2) or index (e.g. 0)
    #[arg(long)]
    pub device: Option<String>,

    /// Requested pixel format FourCC (e.g. YUYV, GREY)
    #[arg(long)]
    pub pixel_format: Option<String>,

    /// Number of warm-up frames to discard before the capture
    #[arg(long)]
    pub warmup_frames: Option<u32>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Recognition backend base URL (overrides the config file)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Video device path (e.g. /dev/video2) or index (e.g. 0)
    #[arg(long)]
    pub device: Option<String>,

    /// Requested pixel format FourCC (e.g. YUYV, GREY)
    #[arg(long)]
    pub pixel_format: Option<String>,

    /// Number of warm-up frames to discard before the capture
    #[arg(long)]
    pub warmup_frames: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

impl From<bool> for OutputMode {
    fn from(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(self.json)
    }
}
