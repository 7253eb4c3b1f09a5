//! Reporting sinks: render per-target verdicts and the final tally.

use anyhow::{Context, Result};
use kdam::Animation;
use log::{info, warn};
use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use super::progress::{
    ProgressBar, ProgressBarConfig, create_progress_bar, finish_bar, refresh_bar,
    update_progress_bar,
};
use crate::utils::Colors;
use crate::utils::config::{LIST_THRESHOLD, PackagePaths, ProgressConsts};
use crate::{ProbeResult, Tally};

/// Receives batch events from the collector, on the collector's thread.
pub trait ReportSink {
    fn on_start(&mut self, _total: usize, _workers: usize) {}
    fn on_result(&mut self, result: &ProbeResult);
    fn on_finish(&mut self, _tally: &Tally, _elapsed: Duration) {}
}

/// Discards everything.
pub struct NullReport;

impl ReportSink for NullReport {
    fn on_result(&mut self, _result: &ProbeResult) {}
}

/// One console line for a result: `✅ url — ok` / `❌ url — status 404`.
pub fn format_result_line(result: &ProbeResult, color: bool) -> String {
    let (mark, c) = if result.works() {
        ("✅", Colors::WORKING)
    } else {
        ("❌", Colors::BROKEN)
    };
    let reason = result.reason();
    let reason = if color {
        Colors::colorize(c, &reason)
    } else {
        reason
    };
    format!("{} {} — {}", mark, result.url, reason)
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        format!("{}m{:02}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    }
}

/// Human output: optional per-target lines (spilled to the results file above LIST_THRESHOLD),
/// optional progress bar, and a coloured summary. Lines go to `out` (stdout by default).
pub struct ConsoleReport<W: Write = Stdout> {
    out: W,
    list: bool,
    show_bar: bool,
    bar: Option<ProgressBar>,
    spill: Option<Vec<String>>,
    spill_path: PathBuf,
}

impl ConsoleReport {
    pub fn new(list: bool, show_bar: bool) -> Self {
        Self {
            out: std::io::stdout(),
            list,
            show_bar,
            bar: None,
            spill: None,
            spill_path: PathBuf::from(PackagePaths::get().results_filename()),
        }
    }
}

impl<W: Write> ConsoleReport<W> {
    /// Send per-target lines to `out` instead of stdout.
    pub fn with_output<V: Write>(self, out: V) -> ConsoleReport<V> {
        ConsoleReport {
            out,
            list: self.list,
            show_bar: self.show_bar,
            bar: self.bar,
            spill: self.spill,
            spill_path: self.spill_path,
        }
    }

    /// Write spilled lines somewhere other than `./liveprobe.results`.
    pub fn with_spill_path(mut self, path: PathBuf) -> Self {
        self.spill_path = path;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_spill(&self, lines: &[String]) -> Result<()> {
        let mut f = std::fs::File::create(&self.spill_path)
            .with_context(|| format!("create {}", self.spill_path.display()))?;
        for line in lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn on_start(&mut self, total: usize, workers: usize) {
        info!("Starting validation of {} streams", total);
        info!("Workers: {}", workers);
        if self.list && total > LIST_THRESHOLD {
            self.spill = Some(Vec::with_capacity(total));
        }
        if self.show_bar {
            let bar = create_progress_bar(ProgressBarConfig::new(
                total,
                ProgressConsts::BAR_DESC,
                Animation::Classic,
            ));
            refresh_bar(&bar);
            self.bar = Some(bar);
        }
    }

    fn on_result(&mut self, result: &ProbeResult) {
        if let Some(bar) = &self.bar {
            update_progress_bar(bar, 1);
        }
        if !self.list {
            return;
        }
        match self.spill.as_mut() {
            Some(lines) => lines.push(format_result_line(result, false)),
            None => {
                if let Err(e) = writeln!(self.out, "{}", format_result_line(result, true)) {
                    warn!("write result line: {}", e);
                }
            }
        }
    }

    fn on_finish(&mut self, tally: &Tally, elapsed: Duration) {
        if let Some(bar) = self.bar.take() {
            finish_bar(&bar);
        }
        if let Some(lines) = self.spill.take() {
            match self.write_spill(&lines) {
                Ok(()) => info!(
                    "{} results written to {}",
                    lines.len(),
                    self.spill_path.display()
                ),
                Err(e) => warn!("{:#}", e),
            }
        }
        info!("Done in {}", format_elapsed(elapsed));
        info!(
            "Results: {} | {}",
            Colors::colorize(Colors::WORKING, &format!("✅ {} working", tally.working)),
            Colors::colorize(Colors::BROKEN, &format!("❌ {} broken", tally.broken))
        );
        if tally.unprobed > 0 {
            info!(
                "{}",
                Colors::colorize(
                    Colors::NOTICE,
                    &format!("{} streams left unprobed", tally.unprobed)
                )
            );
        }
        if tally.persist_failures > 0 {
            warn!("{} verdicts could not be saved", tally.persist_failures);
        }
    }
}

/// JSON lines: one object per result, then a summary object.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn on_result(&mut self, result: &ProbeResult) {
        match serde_json::to_string(&result.record()) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{line}") {
                    warn!("write result line: {}", e);
                }
            }
            Err(e) => warn!("serialize result for {}: {}", result.target_id, e),
        }
    }

    fn on_finish(&mut self, tally: &Tally, elapsed: Duration) {
        let summary = serde_json::json!({
            "summary": tally,
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        if let Err(e) = writeln!(self.out, "{summary}").and_then(|_| self.out.flush()) {
            warn!("write summary: {}", e);
        }
    }
}
