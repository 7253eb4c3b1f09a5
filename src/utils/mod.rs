pub mod config;
pub mod fd_limit;
pub mod liveprobe_toml;
pub mod logger;

pub use config::*;
pub use fd_limit::{
    FDS_PER_WORKER, RESERVED_FDS, max_open_fds, max_workers_by_fd_limit, workers_for_fd_limit,
};
pub use liveprobe_toml::{
    LiveprobeToml, apply_file_to_opts, load_liveprobe_toml, parse_liveprobe_toml,
};
pub use logger::{Colors, setup_logging};
