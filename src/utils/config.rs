//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    db_filename: String,
    config_filename: String,
    results_filename: String,
    db_env_var: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                db_filename: format!("{pkg}.db"),
                config_filename: format!(".{pkg}.toml"),
                results_filename: format!("{pkg}.results"),
                db_env_var: format!("{}_DB", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default catalog database filename (`liveprobe.db`).
    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn results_filename(&self) -> &str {
        &self.results_filename
    }

    /// Environment variable that overrides the catalog path (`LIVEPROBE_DB`).
    pub fn db_env_var(&self) -> &str {
        &self.db_env_var
    }
}

// ---- Worker pool ----

/// Batch defaults: worker count and per-request deadline.
pub struct BatchDefaults;

impl BatchDefaults {
    pub const WORKERS: usize = 10;
    pub const TIMEOUT: Duration = Duration::from_secs(8);
    /// HEAD against the first playlist segment; clipped to what is left of `TIMEOUT`.
    pub const SEGMENT_TIMEOUT: Duration = Duration::from_secs(4);
}

// ---- HTTP transport ----

/// Per-worker connection pool settings.
pub struct PoolConsts;

impl PoolConsts {
    /// Idle connections kept per host.
    pub const MAX_IDLE_PER_HOST: usize = 10;
    pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_REDIRECTS: usize = 10;
}

/// Request headers sent by the prober.
pub struct Headers;

impl Headers {
    /// Browser-like agent for the main GET; some IPTV origins reject unknown agents.
    pub const BROWSER_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
    /// Generic agent for the segment HEAD.
    pub const SEGMENT_USER_AGENT: &'static str = "Mozilla/5.0";
    pub const ACCEPT_ANY: &'static str = "*/*";
}

// ---- Content sniffing ----

/// Byte limits used when reading response bodies.
pub struct BodyLimits;

impl BodyLimits {
    /// Hard cap on playlist bytes read (1 MiB).
    pub const PLAYLIST_CAP: u64 = 1024 * 1024;
    /// Raw media must deliver at least this many bytes.
    pub const MIN_MEDIA_BYTES: usize = 10;
    /// Read buffer for the raw-media sniff.
    pub const MEDIA_READ_BUF: usize = 1024;
}

// ---- Progress ----

pub struct ProgressConsts;

impl ProgressConsts {
    /// Bar description shown while probing.
    pub const BAR_DESC: &'static str = "Probing";
}

// ---- Result listing ----

/// When --list is set, if the number of targets exceeds this, write lines to the results file instead of stdout.
pub const LIST_THRESHOLD: usize = 100;
