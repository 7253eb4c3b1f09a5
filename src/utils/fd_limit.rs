//! Socket budget: how many probe workers fit under the process FD limit (Unix).

use crate::utils::config::PoolConsts;

/// Sockets one worker can hold at once: the in-flight GET, the segment HEAD on a second host,
/// and its client's idle keep-alive pool.
pub const FDS_PER_WORKER: usize = PoolConsts::MAX_IDLE_PER_HOST + 2;

/// Descriptors kept out of the worker budget: stdio, the catalog DB with its WAL and shm files,
/// the results file, and the Ctrl+C handler's pipe.
pub const RESERVED_FDS: usize = 16;

/// Soft RLIMIT_NOFILE, or `None` when unlimited or unavailable.
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let cur = unsafe { rlim.assume_init() }.rlim_cur;
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Workers whose sockets fit in `limit` once [`RESERVED_FDS`] are set aside. Never below 1:
/// a tiny limit still probes, just serially.
pub fn workers_for_fd_limit(limit: u64) -> usize {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    (limit.saturating_sub(RESERVED_FDS) / FDS_PER_WORKER).max(1)
}

/// Worker cap for this process, or `None` when there is no FD limit to respect.
pub fn max_workers_by_fd_limit() -> Option<usize> {
    max_open_fds().map(workers_for_fd_limit)
}
