//! Target list and duration helpers

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::ProbeTarget;

/// Parse a URL list: `<id> <url>` or just `<url>` per line. Bare URLs get their 1-based line
/// number as id. Blank lines and `#` lines are skipped, so an M3U channel list works as-is.
pub fn parse_url_list(text: &str) -> Vec<ProbeTarget> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let target = match line.split_once(char::is_whitespace) {
                Some((id, url)) if !url.trim().is_empty() => ProbeTarget::new(id, url.trim()),
                _ => ProbeTarget::new((i + 1).to_string(), line),
            };
            Some(target)
        })
        .collect()
}

pub fn load_url_list(path: &Path) -> Result<Vec<ProbeTarget>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read URL list {}", path.display()))?;
    Ok(parse_url_list(&text))
}

/// Positive, finite seconds (fractions allowed) to a Duration.
pub fn secs_to_duration(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("expected a positive number of seconds, got {secs}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// clap value parser for `--timeout` / `--segment-timeout`.
pub fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {s}"))?;
    secs_to_duration(secs)
}
