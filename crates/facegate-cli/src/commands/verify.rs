use std::any::Any;
use std::process::ExitCode;

use facegate_core::errors::AppResult;

use crate::cli::{OutputMode, VerifyArgs};
use crate::commands::CommandHandler;
use crate::output::render_verify;
use crate::verify::{self, VerifyRunOutcome};

pub struct VerifyHandler {
    args: VerifyArgs,
    run: Box<dyn Fn(&VerifyArgs) -> AppResult<VerifyRunOutcome> + Send + Sync>,
    render: Box<dyn Fn(&VerifyRunOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl VerifyHandler {
    pub fn new(args: VerifyArgs) -> Self {
        Self::with_dependencies(args, verify::run_verify_command, render_verify)
    }

    pub fn with_dependencies(
        args: VerifyArgs,
        run: impl Fn(&VerifyArgs) -> AppResult<VerifyRunOutcome> + Send + Sync + 'static,
        render: impl Fn(&VerifyRunOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for VerifyHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(if outcome.outcome.success && outcome.outcome.authenticated {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
