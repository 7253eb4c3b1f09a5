//! Load `.liveprobe.toml` from a directory (CLI only). Lib callers pass [`ProbeOpts`](crate::ProbeOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;
use crate::engine::tools::secs_to_duration;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct LiveprobeToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    db_path: Option<String>,
    workers: Option<usize>,
    /// Seconds.
    timeout: Option<f64>,
    /// Seconds.
    segment_timeout: Option<f64>,
    list: Option<bool>,
    json: Option<bool>,
    verbose: Option<bool>,
}

/// Parse config text. Errors are returned as strings for the caller to log.
pub fn parse_liveprobe_toml(s: &str) -> Result<LiveprobeToml, String> {
    toml::from_str(s).map_err(|e| e.to_string())
}

/// Load `.liveprobe.toml` from `dir` if present. Returns None if file missing or unreadable.
pub fn load_liveprobe_toml(dir: &Path) -> Option<LiveprobeToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_liveprobe_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field {
            $opts.$opts_field = v;
        }
    };
}

fn apply_secs(secs: Option<f64>, field: &mut Duration, name: &str) {
    let Some(secs) = secs else { return };
    match secs_to_duration(secs) {
        Ok(d) => *field = d,
        Err(e) => log::warn!(
            "{}: ignoring {}: {}",
            PackagePaths::get().config_filename(),
            name,
            e
        ),
    }
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
/// `dry_run` and `input` are never read from the file.
pub fn apply_file_to_opts(file: &LiveprobeToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.db_path {
        opts.db_path = PathBuf::from(p);
    }
    apply_file_opt!(s, opts, workers => workers);
    apply_secs(s.timeout, &mut opts.timeout, "timeout");
    apply_secs(s.segment_timeout, &mut opts.segment_timeout, "segment_timeout");
    apply_file_opt!(s, opts, list => list_results);
    apply_file_opt!(s, opts, json => json);
    apply_file_opt!(s, opts, verbose => verbose);
}
