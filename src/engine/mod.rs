//! Engine module: probing, clients, catalog stores, reporting and the CLI front.

pub mod arg_parser;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod playlist;
pub mod probe;
pub mod progress;
pub mod report;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use catalog::{CatalogStore, MemoryCatalog, SqliteCatalog, open_db, open_db_in_memory};
pub use cli::handle_run;
pub use client::{ProbeClient, ProbeSettings, build_clients};
pub use playlist::{first_segment_line, first_segment_url, has_extm3u_header, resolve_segment};
pub use probe::{StreamKind, is_media_type, probe_url, read_min_bytes, status_ok, stream_kind};
pub use report::{ConsoleReport, JsonReport, NullReport, ReportSink, format_result_line};
pub use tools::{load_url_list, parse_secs, parse_url_list, secs_to_duration};
