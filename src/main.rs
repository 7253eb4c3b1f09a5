//! liveprobe CLI: probe every channel in the catalog; use --input to probe a URL list, --dry-run to skip writes.

use anyhow::Result;
use clap::Parser;
use liveprobe::engine::arg_parser::Cli;
use liveprobe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
