use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::tools::parse_secs;

/// Concurrent liveness prober for live-TV/IPTV streams.
#[derive(Clone, Debug, Parser)]
#[command(name = "liveprobe")]
#[command(
    about = "Probe every channel URL in the catalog and record whether it plays; use --input to probe a URL list instead."
)]
pub struct Cli {
    /// Path to the channel catalog (SQLite). Default: liveprobe.db, or LIVEPROBE_DB.
    #[arg(long, short)]
    pub db: Option<PathBuf>,

    /// Probe the URLs in this file (`<id> <url>` or `<url>` per line) instead of the catalog. Nothing is saved.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Number of concurrent probe workers. Default: 10.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Per-stream deadline in seconds (fractions allowed). Default: 8.
    #[arg(long, short = 't', value_parser = parse_secs)]
    pub timeout: Option<Duration>,

    /// Upper bound for the playlist segment check, in seconds. Default: 4.
    #[arg(long, value_parser = parse_secs)]
    pub segment_timeout: Option<Duration>,

    /// Probe the catalog but do not write verdicts back.
    #[arg(long)]
    pub dry_run: bool,

    /// Print one line per stream. Above 100 streams, lines go to liveprobe.results instead of stdout.
    #[arg(long, short = 'l', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub list: Option<bool>,

    /// Emit JSON lines (one per stream, then a summary) on stdout.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output: debug logs and a progress bar.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
