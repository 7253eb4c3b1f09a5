//! CLI command handler: probe the catalog (default), a URL list (--input), or the catalog without writing (--dry-run).

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::arg_parser::Cli;
use crate::engine::catalog::{CatalogStore, MemoryCatalog, SqliteCatalog};
use crate::engine::report::{ConsoleReport, JsonReport, ReportSink};
use crate::engine::tools::load_url_list;
use crate::pipeline::run_batch;
use crate::utils::config::PackagePaths;
use crate::utils::{LiveprobeToml, apply_file_to_opts, load_liveprobe_toml, setup_logging};
use crate::{Opts, ProbeOpts, ProbeTarget, Tally};

/// Merge settings: defaults < config file < `LIVEPROBE_DB` < CLI flags.
pub fn build_opts(cli: &Cli, file: Option<&LiveprobeToml>, env_db: Option<PathBuf>) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(db) = env_db {
        opts.db_path = db;
    }
    if let Some(ref db) = cli.db {
        opts.db_path = db.clone();
    }
    opts.input = cli.input.clone();
    if let Some(w) = cli.workers {
        opts.workers = w;
    }
    if let Some(t) = cli.timeout {
        opts.timeout = t;
    }
    if let Some(t) = cli.segment_timeout {
        opts.segment_timeout = t;
    }
    opts.dry_run = cli.dry_run;
    opts.list_results = cli.list.unwrap_or(opts.list_results);
    opts.json = cli.json.unwrap_or(opts.json);
    opts.verbose = cli.verbose.unwrap_or(opts.verbose);
    opts
}

fn env_db_path() -> Option<PathBuf> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    std::env::var_os(PackagePaths::get().db_env_var())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn setup_opts(cli: &Cli) -> Opts {
    let file = load_liveprobe_toml(Path::new("."));
    let opts = build_opts(cli, file.as_ref(), env_db_path());
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );
    opts
}

/// Where targets come from and where verdicts go for this run.
fn open_catalog(opts: &Opts) -> Result<(Vec<ProbeTarget>, Box<dyn CatalogStore>)> {
    if let Some(ref input) = opts.input {
        let targets = load_url_list(input)?;
        debug!("loaded {} targets from {}", targets.len(), input.display());
        return Ok((targets.clone(), Box::new(MemoryCatalog::new(targets))));
    }
    let sqlite = SqliteCatalog::open(&opts.db_path)?;
    let targets = sqlite.list_targets().context("list channels")?;
    if targets.is_empty() {
        warn!("No channels with a URL in {}", opts.db_path.display());
    }
    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NO VERDICTS WILL BE WRITTEN TO THE CATALOG.");
        return Ok((targets.clone(), Box::new(MemoryCatalog::new(targets))));
    }
    Ok((targets, Box::new(sqlite)))
}

fn report_sink(opts: &Opts) -> Box<dyn ReportSink> {
    if opts.json {
        Box::new(JsonReport::new(std::io::stdout()))
    } else {
        // The bar and per-stream lines would fight over the terminal.
        Box::new(ConsoleReport::new(
            opts.list_results,
            opts.verbose && !opts.list_results,
        ))
    }
}

/// Run one batch from CLI args. Ctrl+C stops the workers; verdicts collected so far are kept.
pub fn handle_run(cli: &Cli) -> Result<Tally> {
    let opts = setup_opts(cli);
    let (targets, mut catalog) = open_catalog(&opts)?;
    let mut sink = report_sink(&opts);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let probe_opts = ProbeOpts {
        cancel: Some(Arc::clone(&cancel_requested)),
        ..ProbeOpts::from(&opts)
    };
    let tally = run_batch(targets, &probe_opts, catalog.as_mut(), sink.as_mut())?;

    if cancel_requested.load(Ordering::Relaxed) {
        return Err(anyhow::anyhow!(
            "Probing cancelled by user; {} streams left unprobed, {} verdicts kept",
            tally.unprobed,
            tally.probed()
        ));
    }
    Ok(tally)
}
