//! liveprobe: concurrent liveness prober for live-TV/IPTV streams

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::catalog::CatalogStore;
pub use engine::report::ReportSink;
pub use pipeline::run_batch;

use engine::catalog::MemoryCatalog;
use log::debug;

/// Result alias used by public liveprobe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Probe `targets` without persisting anything and return one result per target, in completion order.
///
/// For persistence and progress use [`run_batch`] with your own [`CatalogStore`] and [`ReportSink`].
///
/// ```ignore
/// let targets = vec![liveprobe::ProbeTarget::new("bbc1", "https://example.com/live/index.m3u8")];
/// let results = liveprobe::probe_targets(targets, &liveprobe::ProbeOpts::default())?;
/// for r in &results {
///     println!("{} {}", r.target_id, r.reason());
/// }
/// ```
pub fn probe_targets(targets: Vec<ProbeTarget>, opts: &ProbeOpts) -> Result<Vec<ProbeResult>> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    let mut catalog = MemoryCatalog::new(targets.clone());
    let mut sink = CollectingReport::default();
    run_batch(targets, opts, &mut catalog, &mut sink)?;
    Ok(sink.results)
}

#[derive(Default)]
struct CollectingReport {
    results: Vec<ProbeResult>,
}

impl ReportSink for CollectingReport {
    fn on_result(&mut self, result: &ProbeResult) {
        self.results.push(result.clone());
    }
}

/// Probe a single URL with a one-off client. Convenience for callers outside a batch.
pub fn probe_one(url: &str, opts: &ProbeOpts) -> Result<Verdict> {
    let client = engine::client::ProbeClient::new(engine::client::ProbeSettings::from(opts))?;
    Ok(client.probe(url))
}
