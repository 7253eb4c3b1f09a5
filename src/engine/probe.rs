//! Probe engine: one URL in, one [`Verdict`] out.
//!
//! GET with a browser agent, status check, then a content sniff that depends on the stream kind:
//! playlists must carry `#EXTM3U` and a first segment that answers a HEAD; raw media must be
//! `video/*` or `audio/*` and deliver a few bytes. Every step is bounded by the client's timeout.

use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};
use url::Url;

use super::client::ProbeClient;
use super::playlist::{first_segment_url, has_extm3u_header};
use crate::utils::config::{BodyLimits, Headers};
use crate::{ProbeFailure, Verdict};

/// How the response body is judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Playlist,
    RawMedia,
}

/// 2xx and 3xx count as reachable.
pub fn status_ok(code: u16) -> bool {
    (200..=399).contains(&code)
}

/// Playlist if the Content-Type names an MPEG-URL type or the URL path ends in `.m3u8`.
pub fn stream_kind(content_type: &str, url: &str) -> StreamKind {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("mpegurl") || url_path_is_m3u8(url) {
        StreamKind::Playlist
    } else {
        StreamKind::RawMedia
    }
}

fn url_path_is_m3u8(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(u) => u.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    path.to_ascii_lowercase().ends_with(".m3u8")
}

pub fn is_media_type(content_type: &str) -> bool {
    let ct = content_type.trim_start().to_ascii_lowercase();
    ct.starts_with("video/") || ct.starts_with("audio/")
}

/// Probe `url` with `client`. Never panics and never returns an error: every failure is a verdict.
pub fn probe_url(client: &ProbeClient, url: &str) -> Verdict {
    check_stream(client, url).into()
}

fn check_stream(client: &ProbeClient, url: &str) -> Result<(), ProbeFailure> {
    let deadline = Instant::now() + client.settings.timeout;
    let parsed = parse_http_url(url)?;

    let response = client
        .http
        .get(parsed.clone())
        .timeout(client.settings.timeout)
        .header(USER_AGENT, Headers::BROWSER_USER_AGENT)
        .header(ACCEPT, Headers::ACCEPT_ANY)
        .send()
        .map_err(|e| {
            if e.is_builder() {
                ProbeFailure::RequestError
            } else {
                ProbeFailure::ConnectionError
            }
        })?;

    let status = response.status().as_u16();
    if !status_ok(status) {
        return Err(ProbeFailure::Status(status));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    match stream_kind(&content_type, parsed.as_str()) {
        StreamKind::Playlist => check_playlist(client, response, &parsed, deadline),
        StreamKind::RawMedia => check_raw_media(response, &content_type, deadline),
    }
}

/// Only http(s) URLs become requests.
fn parse_http_url(url: &str) -> Result<Url, ProbeFailure> {
    let parsed = Url::parse(url.trim()).map_err(|_| ProbeFailure::RequestError)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ProbeFailure::RequestError),
    }
}

fn check_playlist(
    client: &ProbeClient,
    response: Response,
    playlist_url: &Url,
    deadline: Instant,
) -> Result<(), ProbeFailure> {
    let mut body = Vec::new();
    response
        .take(BodyLimits::PLAYLIST_CAP)
        .read_to_end(&mut body)
        .map_err(|_| ProbeFailure::ReadError)?;
    let text = String::from_utf8_lossy(&body);

    if !has_extm3u_header(&text) {
        return Err(ProbeFailure::InvalidM3u8);
    }
    let segment = first_segment_url(&text, playlist_url).ok_or(ProbeFailure::NoSegments)?;

    let budget = client
        .settings
        .segment_timeout
        .min(deadline.saturating_duration_since(Instant::now()));
    if segment_reachable(client, segment, budget) {
        Ok(())
    } else {
        Err(ProbeFailure::SegmentsBroken)
    }
}

/// HEAD the segment within `budget`. Zero budget means the target's deadline is already spent.
fn segment_reachable(client: &ProbeClient, segment: Url, budget: Duration) -> bool {
    if budget.is_zero() {
        return false;
    }
    client
        .http
        .head(segment)
        .timeout(budget)
        .header(USER_AGENT, Headers::SEGMENT_USER_AGENT)
        .send()
        .map(|r| status_ok(r.status().as_u16()))
        .unwrap_or(false)
}

fn check_raw_media(
    mut response: Response,
    content_type: &str,
    deadline: Instant,
) -> Result<(), ProbeFailure> {
    if !is_media_type(content_type) {
        return Err(ProbeFailure::InvalidType);
    }
    read_min_bytes(&mut response, BodyLimits::MIN_MEDIA_BYTES, deadline)
}

/// Read until `min` bytes have arrived. EOF short of `min` is `NoData`; other I/O faults are `ReadError`.
pub fn read_min_bytes<R: Read>(
    reader: &mut R,
    min: usize,
    deadline: Instant,
) -> Result<(), ProbeFailure> {
    let mut buf = [0u8; BodyLimits::MEDIA_READ_BUF];
    let mut total = 0_usize;
    while total < min {
        if Instant::now() >= deadline {
            return Err(ProbeFailure::ReadError);
        }
        match reader.read(&mut buf) {
            Ok(0) => return Err(ProbeFailure::NoData),
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(ProbeFailure::NoData),
            Err(_) => return Err(ProbeFailure::ReadError),
        }
    }
    Ok(())
}
