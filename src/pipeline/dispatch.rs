//! Dispatcher: push every target into the work queue, then close it.

use crossbeam_channel::Sender;
use log::debug;
use std::thread::{self, JoinHandle};

use crate::ProbeTarget;

/// Enqueue `targets` in input order and drop the sender. Dropping the sender is the only
/// termination signal workers see. No deduplication. Returns the number enqueued.
pub fn run_dispatch_loop(target_tx: Sender<ProbeTarget>, targets: Vec<ProbeTarget>) -> usize {
    let mut count = 0_usize;
    for target in targets {
        // Every receiver gone means every worker exited early; nothing left to feed.
        if target_tx.send(target).is_err() {
            break;
        }
        count += 1;
    }
    drop(target_tx);
    debug!("dispatcher: queued {} targets, queue closed", count);
    count
}

pub fn spawn_dispatch_thread(
    target_tx: Sender<ProbeTarget>,
    targets: Vec<ProbeTarget>,
) -> JoinHandle<usize> {
    thread::spawn(move || run_dispatch_loop(target_tx, targets))
}
