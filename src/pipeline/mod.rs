//! Pipeline components: dispatcher, probe workers, collector, orchestration.

pub mod collector;
pub mod context;
pub mod dispatch;
pub mod error_handler;
pub mod orchestrator;
pub mod workers;

pub use collector::collect_results;
pub use context::{
    BatchPhase, CancelFlag, PhaseTracker, PipelineChannels, PipelineHandles,
    create_pipeline_channels,
};
pub use dispatch::{run_dispatch_loop, spawn_dispatch_thread};
pub use error_handler::join_pipeline_threads;
pub use orchestrator::{effective_workers, run_batch, run_pipeline};
pub use workers::{probe_worker_loop, spawn_probe_workers};
