use std::any::Any;
use std::process::ExitCode;

use facegate_core::errors::AppResult;

use crate::cli::{EnrollArgs, OutputMode};
use crate::commands::CommandHandler;
use crate::enroll::{self, EnrollRunOutcome};
use crate::output::render_enroll;

pub struct EnrollHandler {
    args: EnrollArgs,
    run: Box<dyn Fn(&EnrollArgs) -> AppResult<EnrollRunOutcome> + Send + Sync>,
    render: Box<dyn Fn(&EnrollRunOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl EnrollHandler {
    pub fn new(args: EnrollArgs) -> Self {
        Self::with_dependencies(args, enroll::run_enroll_command, render_enroll)
    }

    pub fn with_dependencies(
        args: EnrollArgs,
        run: impl Fn(&EnrollArgs) -> AppResult<EnrollRunOutcome> + Send + Sync + 'static,
        render: impl Fn(&EnrollRunOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for EnrollHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(if outcome.outcome.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
