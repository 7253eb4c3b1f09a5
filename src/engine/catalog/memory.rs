//! In-memory catalog: URL-list mode, dry runs, and tests.

use anyhow::{Result, bail};
use std::collections::HashMap;

use super::CatalogStore;
use crate::ProbeTarget;

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    targets: Vec<ProbeTarget>,
    verdicts: HashMap<String, (bool, String)>,
    /// Ids whose writes fail, to exercise the collector's log-and-continue path.
    failing: Vec<String>,
}

impl MemoryCatalog {
    pub fn new(targets: Vec<ProbeTarget>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    /// Make `set_working` fail for `id`.
    pub fn fail_writes_for(mut self, id: impl Into<String>) -> Self {
        self.failing.push(id.into());
        self
    }

    pub fn verdict(&self, id: &str) -> Option<&(bool, String)> {
        self.verdicts.get(id)
    }

    pub fn verdicts(&self) -> &HashMap<String, (bool, String)> {
        &self.verdicts
    }
}

impl CatalogStore for MemoryCatalog {
    fn list_targets(&self) -> Result<Vec<ProbeTarget>> {
        Ok(self.targets.iter().filter(|t| !t.url.is_empty()).cloned().collect())
    }

    fn set_working(&mut self, id: &str, works: bool, reason: &str) -> Result<()> {
        if self.failing.iter().any(|f| f == id) {
            bail!("write rejected for channel {id}");
        }
        if !self.targets.iter().any(|t| t.id == id) {
            bail!("channel {id} not found");
        }
        self.verdicts
            .insert(id.to_string(), (works, reason.to_string()));
        Ok(())
    }
}
