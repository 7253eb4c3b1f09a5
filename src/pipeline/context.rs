//! Pipeline context: batch phases, channels and the handles the orchestrator joins.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::{ProbeResult, ProbeTarget};

/// Batch lifecycle. Dispatching and Probing overlap: workers start pulling as soon as the first target lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Dispatching,
    Probing,
    Collecting,
    Done,
}

/// Tracks the current phase and logs each transition.
#[derive(Debug)]
pub struct PhaseTracker {
    phase: BatchPhase,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self {
            phase: BatchPhase::Idle,
        }
    }
}

impl PhaseTracker {
    pub fn advance(&mut self, next: BatchPhase) {
        debug!("batch phase: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }
}

/// Shared cancel flag. Absent flag means the batch cannot be cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Option<Arc<AtomicBool>>);

impl CancelFlag {
    pub fn new(flag: Option<Arc<AtomicBool>>) -> Self {
        Self(flag)
    }

    pub fn is_raised(&self) -> bool {
        self.0.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

/// Work queue and result stream. Both are sized to the batch so neither the dispatcher nor a
/// worker ever blocks on send.
pub struct PipelineChannels {
    pub target_tx: Sender<ProbeTarget>,
    pub target_rx: Receiver<ProbeTarget>,
    pub result_tx: Sender<ProbeResult>,
    pub result_rx: Receiver<ProbeResult>,
}

pub fn create_pipeline_channels(target_count: usize) -> PipelineChannels {
    let cap = target_count.max(1);
    let (target_tx, target_rx) = bounded::<ProbeTarget>(cap);
    let (result_tx, result_rx) = bounded::<ProbeResult>(cap);
    PipelineChannels {
        target_tx,
        target_rx,
        result_tx,
        result_rx,
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): drain `result_rx`, then join.
/// `result_rx` closes only once every worker has dropped its sender.
pub struct PipelineHandles {
    pub result_rx: Receiver<ProbeResult>,
    /// Returns the number of targets enqueued.
    pub dispatch_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub workers: usize,
}
