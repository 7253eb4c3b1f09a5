//! Channel catalog backed by SQLite (table `channels`).

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{
    CatalogStore, LIST_TARGETS_SQL, SET_WORKING_SQL, UPSERT_TARGET_SQL, open_db, open_db_in_memory,
};
use crate::ProbeTarget;

/// Stored verdict for one channel: (is_working, reason, checked_at). All NULL until first probed.
pub type StoredStatus = (Option<bool>, Option<String>, Option<i64>);

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a channel or replace its URL. Verdict columns are left untouched.
    pub fn add_target(&self, id: &str, url: &str) -> Result<()> {
        self.conn
            .execute(UPSERT_TARGET_SQL, (id, url))
            .with_context(|| format!("upsert channel {id}"))?;
        Ok(())
    }

    /// Last stored verdict for `id`, or `None` if the channel does not exist.
    pub fn status(&self, id: &str) -> Result<Option<StoredStatus>> {
        self.conn
            .query_row(
                "SELECT is_working, reason, checked_at FROM channels WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .context("read channel status")
    }

    /// Number of channels with a non-empty URL.
    pub fn target_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM channels WHERE url IS NOT NULL AND url != ''",
                [],
                |row| row.get(0),
            )
            .context("count channels")?;
        Ok(n.max(0) as usize)
    }
}

impl CatalogStore for SqliteCatalog {
    fn list_targets(&self) -> Result<Vec<ProbeTarget>> {
        let mut stmt = self
            .conn
            .prepare(LIST_TARGETS_SQL)
            .context("prepare list channels")?;
        let rows = stmt.query_map([], |row| {
            Ok(ProbeTarget {
                id: row.get(0)?,
                url: row.get(1)?,
            })
        })?;
        let mut targets = Vec::new();
        for row in rows {
            targets.push(row.context("read channel row")?);
        }
        Ok(targets)
    }

    fn set_working(&mut self, id: &str, works: bool, reason: &str) -> Result<()> {
        let checked_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let updated = self
            .conn
            .execute(SET_WORKING_SQL, (id, works, reason, checked_at))
            .with_context(|| format!("update channel {id}"))?;
        if updated == 0 {
            bail!("channel {id} not found");
        }
        Ok(())
    }
}
