use anyhow::{Result, ensure};
use log::debug;
use std::time::Instant;

use super::context::{BatchPhase, CancelFlag, PhaseTracker, PipelineHandles};
use super::{
    collect_results, create_pipeline_channels, join_pipeline_threads, spawn_dispatch_thread,
    spawn_probe_workers,
};
use crate::engine::catalog::CatalogStore;
use crate::engine::client::{ProbeSettings, build_clients};
use crate::engine::report::ReportSink;
use crate::utils::fd_limit::max_workers_by_fd_limit;
use crate::{ProbeOpts, ProbeTarget, Tally};

/// Worker count actually spawned: at least 1, no more than there are targets, capped by the FD limit.
pub fn effective_workers(requested: usize, target_count: usize) -> usize {
    let n = requested.max(1).min(target_count.max(1));
    match max_workers_by_fd_limit() {
        Some(fd_cap) if fd_cap < n => {
            debug!("Capping workers {} -> {} (FD limit)", n, fd_cap);
            fd_cap
        }
        _ => n,
    }
}

/// Start dispatcher and workers. Clients are built before any thread starts, so a client
/// failure aborts with nothing in flight. Caller drains `result_rx` and then joins.
pub fn run_pipeline(
    targets: Vec<ProbeTarget>,
    opts: &ProbeOpts,
    phase: &mut PhaseTracker,
) -> Result<PipelineHandles> {
    let workers = effective_workers(opts.workers, targets.len());
    let clients = build_clients(workers, ProbeSettings::from(opts))?;
    let channels = create_pipeline_channels(targets.len());
    let cancel = CancelFlag::new(opts.cancel.clone());

    phase.advance(BatchPhase::Dispatching);
    let dispatch_handle = spawn_dispatch_thread(channels.target_tx, targets);

    phase.advance(BatchPhase::Probing);
    let worker_handles =
        spawn_probe_workers(clients, channels.target_rx, &channels.result_tx, &cancel);

    // Dropping the last non-worker sender: the stream closes when the last worker exits.
    drop(channels.result_tx);

    Ok(PipelineHandles {
        result_rx: channels.result_rx,
        dispatch_handle,
        worker_handles,
        workers,
    })
}

/// Main orchestrator: probe every target, persist each verdict through `catalog`, report through
/// `sink`, and return the tally. Dispatcher → work queue → workers → result stream → collector.
///
/// Per-target failures never surface here; only systemic ones do (client construction, a
/// panicked thread).
pub fn run_batch(
    targets: Vec<ProbeTarget>,
    opts: &ProbeOpts,
    catalog: &mut dyn CatalogStore,
    sink: &mut dyn ReportSink,
) -> Result<Tally> {
    let start = Instant::now();
    let mut phase = PhaseTracker::default();
    let total = targets.len();

    if total == 0 {
        debug!("no targets; nothing to probe");
        sink.on_start(0, 0);
        phase.advance(BatchPhase::Done);
        let tally = Tally::default();
        sink.on_finish(&tally, start.elapsed());
        return Ok(tally);
    }

    let PipelineHandles {
        result_rx,
        dispatch_handle,
        worker_handles,
        workers,
    } = run_pipeline(targets, opts, &mut phase)?;
    sink.on_start(total, workers);

    phase.advance(BatchPhase::Collecting);
    let mut tally = collect_results(result_rx, catalog, sink);

    let dispatched = join_pipeline_threads(dispatch_handle, worker_handles)?;
    debug!("{} of {} targets dispatched", dispatched, total);
    // Targets still queued (or never queued) when workers stopped early.
    tally.unprobed = total.saturating_sub(tally.probed());
    ensure!(
        tally.unprobed == 0 || CancelFlag::new(opts.cancel.clone()).is_raised(),
        "{} of {} targets produced no result",
        tally.unprobed,
        total
    );

    phase.advance(BatchPhase::Done);
    sink.on_finish(&tally, start.elapsed());
    Ok(tally)
}
