use std::error::Error;
use std::io::{self, Write};

use serde_json::json;

use facegate_core::errors::{AppError, AppResult};

use crate::capture::CaptureOutcome;
use crate::cli::OutputMode;
use crate::enroll::EnrollRunOutcome;
use crate::verify::VerifyRunOutcome;

pub fn render_capture(outcome: &CaptureOutcome, mode: OutputMode) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            for line in &outcome.logs {
                println!("{line}");
            }
            println!("Capture successful: {}", outcome.summary.output_path);
        }
        OutputMode::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let payload = serde_json::to_string(&outcome.summary)?;
            handle.write_all(payload.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn render_enroll(outcome: &EnrollRunOutcome, mode: OutputMode, verbose: bool) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            if verbose {
                for line in &outcome.logs {
                    tracing::info!("{line}");
                }
            }
            if outcome.outcome.success {
                println!(
                    "Enrollment successful for {}: {}",
                    outcome.subject, outcome.outcome.message
                );
            } else {
                println!("Enrollment failed: {}", outcome.outcome.message);
            }
        }
        OutputMode::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let payload = serde_json::to_string(&json!({
                "subject": outcome.subject,
                "success": outcome.outcome.success,
                "message": outcome.outcome.message,
            }))?;
            handle.write_all(payload.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn render_verify(outcome: &VerifyRunOutcome, mode: OutputMode, verbose: bool) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            if verbose {
                for line in &outcome.logs {
                    tracing::info!("{line}");
                }
            }
            let result = &outcome.outcome;
            if result.success && result.authenticated {
                match (&result.subject, result.confidence) {
                    (Some(subject), Some(confidence)) => {
                        println!("Identity verified: {subject} (confidence {confidence})");
                    }
                    (Some(subject), None) => println!("Identity verified: {subject}"),
                    _ => println!("Identity verified"),
                }
            } else if result.success {
                println!("Identity not recognized");
            } else {
                println!(
                    "Verification failed: {}",
                    result.message.as_deref().unwrap_or("unknown error")
                );
            }
        }
        OutputMode::Json => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let payload = serde_json::to_string(&outcome.outcome)?;
            handle.write_all(payload.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn render_error(err: &AppError, mode: OutputMode) {
    match mode {
        OutputMode::Human => {
            eprintln!("error: {}", err.human_message());
            if let Some(source) = err.source() {
                eprintln!("cause: {source}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "success": false,
                "error": err.human_message(),
            });
            if let Ok(json) = serde_json::to_string(&payload) {
                println!("{json}");
            }
            if let Some(source) = err.source() {
                eprintln!("cause: {source}");
            }
        }
    }
}
