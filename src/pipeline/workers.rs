//! Probe workers: each owns one client and drains the shared work queue.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread::{self, JoinHandle};

use super::context::CancelFlag;
use crate::engine::client::ProbeClient;
use crate::{ProbeResult, ProbeTarget};

/// Single worker: pull a target, probe it, push exactly one result. Exits when the queue is
/// closed and empty, or when the cancel flag is raised.
pub fn probe_worker_loop(
    worker_id: usize,
    client: ProbeClient,
    target_rx: Receiver<ProbeTarget>,
    result_tx: Sender<ProbeResult>,
    cancel: CancelFlag,
) {
    let mut probed = 0_usize;
    while !cancel.is_raised() {
        let Ok(target) = target_rx.recv() else { break };
        let verdict = client.probe(&target.url);
        debug!("worker {}: {} -> {}", worker_id, target.url, verdict);
        if result_tx.send(ProbeResult::new(target, verdict)).is_err() {
            break;
        }
        probed += 1;
    }
    debug!("worker {}: exiting after {} probes", worker_id, probed);
    drop(result_tx);
}

/// Spawn one worker per client. Caller must drop its own `result_tx` afterwards so the result
/// stream closes when the last worker exits.
pub fn spawn_probe_workers(
    clients: Vec<ProbeClient>,
    target_rx: Receiver<ProbeTarget>,
    result_tx: &Sender<ProbeResult>,
    cancel: &CancelFlag,
) -> Vec<JoinHandle<()>> {
    clients
        .into_iter()
        .enumerate()
        .map(|(worker_id, client)| {
            let target_rx = target_rx.clone();
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            thread::spawn(move || {
                probe_worker_loop(worker_id, client, target_rx, result_tx, cancel)
            })
        })
        .collect()
}
