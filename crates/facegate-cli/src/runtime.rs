use std::future::Future;

use facegate_core::errors::AppResult;

/// Drives a workflow future to completion on a single-threaded runtime. All
/// suspension points are cooperative (network I/O); no worker threads.
pub fn block_on<F: Future>(future: F) -> AppResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
