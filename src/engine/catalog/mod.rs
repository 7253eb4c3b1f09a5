//! Catalog stores: where targets come from and where verdicts go.

mod connection;
mod memory;
mod sqlite;

pub use connection::{open_db, open_db_in_memory};
pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use anyhow::Result;

use crate::ProbeTarget;

/// External collaborator that supplies targets and persists the working flag.
///
/// `set_working` must be idempotent: the collector calls it once per result and treats a failure
/// as a warning, not a batch error.
pub trait CatalogStore {
    fn list_targets(&self) -> Result<Vec<ProbeTarget>>;
    fn set_working(&mut self, id: &str, works: bool, reason: &str) -> Result<()>;
}

/// WAL tuning pragmas (synchronous, autocheckpoint). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        "#;

/// Schema for the channels table.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS channels (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL DEFAULT '',
    is_working INTEGER,
    reason TEXT,
    checked_at INTEGER
);
"#;

pub(crate) const LIST_TARGETS_SQL: &str =
    "SELECT id, url FROM channels WHERE url IS NOT NULL AND url != '' ORDER BY rowid";

pub(crate) const SET_WORKING_SQL: &str =
    "UPDATE channels SET is_working = ?2, reason = ?3, checked_at = ?4 WHERE id = ?1";

pub(crate) const UPSERT_TARGET_SQL: &str =
    "INSERT INTO channels (id, url) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET url = excluded.url";
