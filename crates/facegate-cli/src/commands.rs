use std::any::Any;
use std::process::ExitCode;

use facegate_core::errors::AppResult;

use crate::capture::CaptureHandler;
use crate::cli::{Commands, OutputMode};

pub trait CommandHandler: Send + Sync {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode>;
    fn as_any(&self) -> &dyn Any;
}

mod enroll;
mod verify;

pub use enroll::EnrollHandler;
pub use verify::VerifyHandler;

impl From<Commands> for Box<dyn CommandHandler> {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Capture(args) => Box::new(CaptureHandler::new(args)),
            Commands::Enroll(args) => Box::new(EnrollHandler::new(args)),
            Commands::Verify(args) => Box::new(VerifyHandler::new(args)),
        }
    }
}
