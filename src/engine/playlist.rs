//! Minimal M3U8 handling: header check and first segment reference.
//! Permissive on purpose; tag order, durations and variants are not validated.

use url::Url;

/// Required first tag of an extended M3U playlist.
pub const EXTM3U_TAG: &str = "#EXTM3U";

/// Path suffixes that mark a URI line as a media segment (or a nested variant playlist).
const SEGMENT_SUFFIXES: [&str; 4] = [".ts", ".m4s", ".mp4", ".m3u8"];

pub fn has_extm3u_header(body: &str) -> bool {
    body.contains(EXTM3U_TAG)
}

/// True if the URI line looks like a segment. Query and fragment are ignored for the suffix test.
pub fn looks_like_segment(line: &str) -> bool {
    let path = line.split(['?', '#']).next().unwrap_or(line);
    SEGMENT_SUFFIXES.iter().any(|s| path.ends_with(s)) || line.contains("segment")
}

/// First non-comment, non-blank line that looks like a segment.
pub fn first_segment_line(body: &str) -> Option<&str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .find(|l| looks_like_segment(l))
}

/// Absolute references are used as-is; relative ones resolve against the playlist URL.
pub fn resolve_segment(playlist_url: &Url, reference: &str) -> Option<Url> {
    match Url::parse(reference) {
        Ok(abs) => Some(abs),
        Err(url::ParseError::RelativeUrlWithoutBase) => playlist_url.join(reference).ok(),
        Err(_) => None,
    }
}

/// First segment of `body`, resolved against `playlist_url`. `None` when there is nothing to check.
pub fn first_segment_url(body: &str, playlist_url: &Url) -> Option<Url> {
    first_segment_line(body).and_then(|line| resolve_segment(playlist_url, line))
}
