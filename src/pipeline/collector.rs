//! Result collector: the single consumer of the result stream.

use crossbeam_channel::Receiver;
use log::{debug, warn};

use crate::engine::catalog::CatalogStore;
use crate::engine::report::ReportSink;
use crate::{ProbeResult, Tally};

/// Drain `result_rx` until every worker has exited. Each result is persisted through `catalog`
/// (a failed write is logged and counted, never fatal) and handed to `sink`.
pub fn collect_results(
    result_rx: Receiver<ProbeResult>,
    catalog: &mut dyn CatalogStore,
    sink: &mut dyn ReportSink,
) -> Tally {
    let mut tally = Tally::default();
    while let Ok(result) = result_rx.recv() {
        let reason = result.reason();
        if let Err(e) = catalog.set_working(&result.target_id, result.works(), &reason) {
            warn!("Failed to update channel {}: {:#}", result.target_id, e);
            tally.persist_failures += 1;
        }
        tally.record(&result);
        sink.on_result(&result);
    }
    debug!(
        "collector: result stream closed after {} results",
        tally.probed()
    );
    tally
}
