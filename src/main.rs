use anyhow::Result;
use sitetally::{cli::run_cli, utils::runtime::single_thread_runtime};
use tracing::error;

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    // `serve` and `sites set -` leave a thread blocked on stdin.
    runtime.shutdown_background();
    result
}
