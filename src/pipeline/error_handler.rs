use anyhow::Result;
use std::thread::JoinHandle;

/// Join the dispatcher and every worker. Returns the dispatched count, or an error naming the
/// first thread that panicked. Call after the result stream has been drained.
pub fn join_pipeline_threads(
    dispatch_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<()>>,
) -> Result<usize> {
    let dispatched = dispatch_handle
        .join()
        .map_err(|_| anyhow::anyhow!("dispatcher thread panicked"))?;
    let mut panicked = Vec::new();
    for (id, h) in worker_handles.into_iter().enumerate() {
        if h.join().is_err() {
            panicked.push(id);
        }
    }
    if !panicked.is_empty() {
        return Err(anyhow::anyhow!("probe workers panicked: {:?}", panicked));
    }
    Ok(dispatched)
}
