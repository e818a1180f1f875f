use std::env::args;

use anyhow::Result;
use clap::Parser;
use sitetally::{
    daemon::{args::HostArgs, start_daemon},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, HOST_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

fn main() -> Result<()> {
    let args = HostArgs::parse_from(args());
    run(args)
}

fn run(args: HostArgs) -> Result<()> {
    let app_dir = args.dir.clone().map_or_else(create_application_default_path, Ok)?;
    enable_logging(HOST_PREFIX, &app_dir, args.log, args.log_console)?;

    let runtime = single_thread_runtime()?;
    let result = runtime
        .block_on(start_daemon(app_dir, args.host_config()))
        .inspect_err(|e| error!("Host failed {e:?}"));
    // Reading stdin blocks a worker thread that never learns about the shutdown.
    runtime.shutdown_background();
    result
}
