//! Batch runs: completeness, concurrency invariance, persistence, cancellation.

mod common;

use common::{Reply, TestServer, refused_url};
use liveprobe::engine::{MemoryCatalog, NullReport, ReportSink, SqliteCatalog};
use liveprobe::{CatalogStore, ProbeOpts, ProbeResult, ProbeTarget, Tally, probe_targets, run_batch};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

const TS_BYTES: &[u8] = &[0x47; 188];

fn opts(workers: usize, timeout_secs: u64) -> ProbeOpts {
    ProbeOpts {
        workers,
        timeout: Duration::from_secs(timeout_secs),
        segment_timeout: Duration::from_secs(timeout_secs),
        cancel: None,
    }
}

type Expected = HashMap<String, (bool, String)>;

/// Server with a mix of healthy and broken streams; returns targets and expected verdicts by id.
fn mixed_targets(server: &TestServer, n: usize) -> (Vec<ProbeTarget>, Expected) {
    server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    server.route("/page", Reply::media("text/html", "<html></html>"));
    server.route(
        "/hls/index.m3u8",
        Reply::playlist("#EXTM3U\n#EXTINF:6,\nseg.ts\n"),
    );
    server.route("/hls/seg.ts", Reply::media("video/mp2t", TS_BYTES));
    server.route("/dead/index.m3u8", Reply::playlist("#EXTM3U\n#EXTINF:6,\nseg.ts\n"));
    server.head_route("/dead/seg.ts", Reply::status(500));
    let refused = refused_url();

    let mut targets = Vec::new();
    let mut expected = HashMap::new();
    for i in 0..n {
        let id = format!("ch{i:03}");
        let (url, works, reason) = match i % 6 {
            0 => (server.url("/ok.ts"), true, "ok"),
            1 => (server.url(&format!("/missing/{i}.ts")), false, "status 404"),
            2 => (server.url("/page"), false, "invalid type"),
            3 => (server.url("/hls/index.m3u8"), true, "ok"),
            4 => (server.url("/dead/index.m3u8"), false, "segments broken"),
            _ => (refused.clone(), false, "connection error"),
        };
        expected.insert(id.clone(), (works, reason.to_string()));
        targets.push(ProbeTarget::new(id, url));
    }
    (targets, expected)
}

#[derive(Default)]
struct Recorder {
    started: Option<(usize, usize)>,
    results: Vec<ProbeResult>,
    finished: Option<Tally>,
}

impl ReportSink for Recorder {
    fn on_start(&mut self, total: usize, workers: usize) {
        self.started = Some((total, workers));
    }
    fn on_result(&mut self, result: &ProbeResult) {
        self.results.push(result.clone());
    }
    fn on_finish(&mut self, tally: &Tally, _elapsed: Duration) {
        self.finished = Some(*tally);
    }
}

// --- completeness ---

#[test]
fn test_every_target_yields_exactly_one_result() {
    let server = TestServer::start();
    let (targets, expected) = mixed_targets(&server, 48);
    let mut catalog = MemoryCatalog::new(targets.clone());
    let mut sink = Recorder::default();

    let tally = run_batch(targets.clone(), &opts(8, 5), &mut catalog, &mut sink).unwrap();

    assert_eq!(sink.results.len(), targets.len());
    let ids: HashSet<_> = sink.results.iter().map(|r| r.target_id.clone()).collect();
    assert_eq!(ids.len(), targets.len(), "duplicate results");
    let want: HashSet<_> = targets.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, want);

    for r in &sink.results {
        let (works, reason) = &expected[&r.target_id];
        assert_eq!(r.works(), *works, "{}", r.url);
        assert_eq!(&r.reason(), reason, "{}", r.url);
    }
    assert_eq!(tally.working + tally.broken, 48);
    assert_eq!(tally.working, 16);
    assert_eq!(tally.unprobed, 0);
    assert_eq!(sink.started, Some((48, 8)));
    assert_eq!(sink.finished, Some(tally));
    assert_eq!(catalog.verdicts().len(), 48);
}

#[test]
fn test_duplicate_targets_are_not_deduplicated() {
    let server = TestServer::start();
    let url = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let targets = vec![
        ProbeTarget::new("a", url.clone()),
        ProbeTarget::new("a", url.clone()),
        ProbeTarget::new("b", url),
    ];
    let results = probe_targets(targets, &opts(2, 5)).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.target_id == "a").count(), 2);
}

#[test]
fn test_empty_batch() {
    let mut catalog = MemoryCatalog::default();
    let mut sink = Recorder::default();
    let tally = run_batch(Vec::new(), &opts(10, 1), &mut catalog, &mut sink).unwrap();
    assert_eq!(tally, Tally::default());
    assert_eq!(sink.started, Some((0, 0)));
    assert!(sink.results.is_empty());
}

#[test]
fn test_more_workers_than_targets() {
    let server = TestServer::start();
    let url = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let targets = vec![ProbeTarget::new("only", url)];
    let mut catalog = MemoryCatalog::new(targets.clone());
    let mut sink = Recorder::default();
    let tally = run_batch(targets, &opts(50, 5), &mut catalog, &mut sink).unwrap();
    assert_eq!(tally.working, 1);
    assert_eq!(sink.started, Some((1, 1)));
}

// --- concurrency invariance ---

#[test]
fn test_worker_count_does_not_change_verdicts() {
    let server = TestServer::start();
    let (targets, _) = mixed_targets(&server, 36);

    let run = |workers: usize| {
        let results = probe_targets(targets.clone(), &opts(workers, 5)).unwrap();
        let mut pairs: Vec<(String, bool, String)> = results
            .into_iter()
            .map(|r| (r.target_id.clone(), r.works(), r.reason()))
            .collect();
        pairs.sort();
        pairs
    };

    assert_eq!(run(1), run(50));
}

// --- timeouts ---

#[test]
fn test_hanging_targets_do_not_hang_the_batch() {
    let server = TestServer::start();
    let hang = server.route("/hang.ts", Reply::hanging(Duration::from_secs(30)));
    let ok = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let targets = vec![
        ProbeTarget::new("h1", hang.clone()),
        ProbeTarget::new("h2", hang.clone()),
        ProbeTarget::new("h3", hang),
        ProbeTarget::new("ok", ok),
    ];
    let start = Instant::now();
    let results = probe_targets(targets, &opts(4, 1)).unwrap();
    assert!(start.elapsed() < Duration::from_secs(4), "took {:?}", start.elapsed());
    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| r.works()).count(), 1);
}

// --- persistence ---

#[test]
fn test_failed_writes_are_counted_not_fatal() {
    let server = TestServer::start();
    let url = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let targets = vec![
        ProbeTarget::new("a", url.clone()),
        ProbeTarget::new("b", url.clone()),
        ProbeTarget::new("c", server.url("/nope")),
    ];
    let mut catalog = MemoryCatalog::new(targets.clone()).fail_writes_for("b");
    let tally = run_batch(targets, &opts(3, 5), &mut catalog, &mut NullReport).unwrap();

    assert_eq!(tally.working, 2);
    assert_eq!(tally.broken, 1);
    assert_eq!(tally.persist_failures, 1);
    assert!(catalog.verdict("b").is_none());
    assert_eq!(catalog.verdict("a"), Some(&(true, "ok".to_string())));
    assert_eq!(catalog.verdict("c"), Some(&(false, "status 404".to_string())));
}

#[test]
fn test_sqlite_catalog_round_trip() {
    let server = TestServer::start();
    let ok = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let mut catalog = SqliteCatalog::open_in_memory().unwrap();
    catalog.add_target("good", &ok).unwrap();
    catalog.add_target("bad", &server.url("/gone.ts")).unwrap();
    catalog.add_target("blank", "").unwrap();

    let targets = catalog.list_targets().unwrap();
    assert_eq!(targets.len(), 2);

    let tally = run_batch(targets, &opts(2, 5), &mut catalog, &mut NullReport).unwrap();
    assert_eq!((tally.working, tally.broken), (1, 1));

    let (works, reason, checked_at) = catalog.status("good").unwrap().unwrap();
    assert_eq!(works, Some(true));
    assert_eq!(reason.as_deref(), Some("ok"));
    assert!(checked_at.is_some());

    let (works, reason, _) = catalog.status("bad").unwrap().unwrap();
    assert_eq!(works, Some(false));
    assert_eq!(reason.as_deref(), Some("status 404"));

    let (works, _, _) = catalog.status("blank").unwrap().unwrap();
    assert_eq!(works, None);
}

// --- cancellation ---

#[test]
fn test_cancelled_batch_reports_unprobed() {
    let server = TestServer::start();
    let url = server.route("/ok.ts", Reply::media("video/mp2t", TS_BYTES));
    let targets: Vec<_> = (0..5)
        .map(|i| ProbeTarget::new(format!("t{i}"), url.clone()))
        .collect();
    let cancel = Arc::new(AtomicBool::new(true));
    let opts = ProbeOpts {
        cancel: Some(cancel),
        ..opts(2, 5)
    };
    let mut catalog = MemoryCatalog::new(targets.clone());
    let tally = run_batch(targets, &opts, &mut catalog, &mut NullReport).unwrap();
    assert_eq!(tally.probed(), 0);
    assert_eq!(tally.unprobed, 5);
    assert!(catalog.verdicts().is_empty());
}
