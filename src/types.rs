//! Public and internal types for the liveprobe API and pipeline.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::utils::config::BatchDefaults;

/// One stream to probe. `id` is opaque to the prober; it is whatever key the catalog uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProbeTarget {
    pub id: String,
    pub url: String,
}

impl ProbeTarget {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Why a stream was classified as not working. `Display` is the label persisted to the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ProbeFailure {
    /// URL could not be turned into a request (unparsable, unsupported scheme).
    #[error("request error")]
    RequestError,
    /// DNS, TLS, refused connection or timeout before a response arrived.
    #[error("connection error")]
    ConnectionError,
    /// Final status outside 200..=399.
    #[error("status {0}")]
    Status(u16),
    /// Non-playlist response whose Content-Type is not `video/*` or `audio/*`.
    #[error("invalid type")]
    InvalidType,
    /// Media body ended before the minimum byte count.
    #[error("no data")]
    NoData,
    /// I/O fault while reading the body.
    #[error("read error")]
    ReadError,
    /// Playlist body without the `#EXTM3U` header.
    #[error("invalid m3u8")]
    InvalidM3u8,
    /// Playlist without a usable segment reference.
    #[error("no segments")]
    NoSegments,
    /// First segment unreachable or answered outside 200..=399.
    #[error("segments broken")]
    SegmentsBroken,
}

/// Terminal classification of one probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Ok,
    Broken(ProbeFailure),
}

impl Verdict {
    pub fn works(&self) -> bool {
        matches!(self, Verdict::Ok)
    }

    pub fn failure(&self) -> Option<ProbeFailure> {
        match self {
            Verdict::Ok => None,
            Verdict::Broken(f) => Some(*f),
        }
    }
}

impl From<ProbeFailure> for Verdict {
    fn from(f: ProbeFailure) -> Self {
        Verdict::Broken(f)
    }
}

impl From<Result<(), ProbeFailure>> for Verdict {
    fn from(r: Result<(), ProbeFailure>) -> Self {
        match r {
            Ok(()) => Verdict::Ok,
            Err(f) => Verdict::Broken(f),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => f.write_str("ok"),
            Verdict::Broken(failure) => write!(f, "{failure}"),
        }
    }
}

/// Outcome for one target. Built once by the worker that probed it; never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    pub target_id: String,
    pub url: String,
    pub verdict: Verdict,
}

impl ProbeResult {
    pub fn new(target: ProbeTarget, verdict: Verdict) -> Self {
        Self {
            target_id: target.id,
            url: target.url,
            verdict,
        }
    }

    pub fn works(&self) -> bool {
        self.verdict.works()
    }

    /// Human-readable reason (`ok`, `status 404`, `segments broken`, ...).
    pub fn reason(&self) -> String {
        self.verdict.to_string()
    }

    /// Flat view for JSON output.
    pub fn record(&self) -> ResultRecord<'_> {
        ResultRecord {
            id: &self.target_id,
            url: &self.url,
            works: self.works(),
            reason: self.reason(),
        }
    }
}

/// Serializable line emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub id: &'a str,
    pub url: &'a str,
    pub works: bool,
    pub reason: String,
}

/// Final counts for a batch. `working + broken + unprobed` equals the number of targets dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub working: usize,
    pub broken: usize,
    /// Results whose catalog write failed (still counted in working/broken).
    pub persist_failures: usize,
    /// Targets left in the queue when the batch was cancelled.
    pub unprobed: usize,
}

impl Tally {
    pub fn probed(&self) -> usize {
        self.working + self.broken
    }

    pub fn record(&mut self, result: &ProbeResult) {
        if result.works() {
            self.working += 1;
        } else {
            self.broken += 1;
        }
    }
}

/// Lib options for a batch. Passed explicitly into the batch runner; no process-wide state.
#[derive(Clone, Debug)]
pub struct ProbeOpts {
    /// Probe workers; each owns one HTTP client. Capped by target count and FD limit.
    pub workers: usize,
    /// Deadline for one target, covering the GET, the body sniff and the segment HEAD.
    pub timeout: Duration,
    /// Upper bound for the segment HEAD. Clipped to what is left of `timeout`.
    pub segment_timeout: Duration,
    /// Raised to stop workers from pulling more targets. Remaining targets produce no result.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ProbeOpts {
    fn default() -> Self {
        Self {
            workers: BatchDefaults::WORKERS,
            timeout: BatchDefaults::TIMEOUT,
            segment_timeout: BatchDefaults::SEGMENT_TIMEOUT,
            cancel: None,
        }
    }
}

impl From<&Opts> for ProbeOpts {
    fn from(o: &Opts) -> Self {
        ProbeOpts {
            workers: o.workers,
            timeout: o.timeout,
            segment_timeout: o.segment_timeout,
            cancel: None,
        }
    }
}

/// Full options (CLI). Use [`ProbeOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Catalog database path.
    pub db_path: PathBuf,
    /// URL list to probe instead of the catalog. Nothing is persisted in this mode.
    pub input: Option<PathBuf>,
    pub workers: usize,
    pub timeout: Duration,
    pub segment_timeout: Duration,
    /// Probe the catalog without writing verdicts back.
    pub dry_run: bool,
    /// Print one line per target. Above LIST_THRESHOLD lines go to the results file.
    pub list_results: bool,
    /// Emit JSON lines on stdout instead of the console report.
    pub json: bool,
    /// Debug logging and progress bar.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        let probe = ProbeOpts::default();
        Self {
            db_path: PathBuf::from(crate::utils::PackagePaths::get().db_filename()),
            input: None,
            workers: probe.workers,
            timeout: probe.timeout,
            segment_timeout: probe.segment_timeout,
            dry_run: false,
            list_results: false,
            json: false,
            verbose: false,
        }
    }
}
