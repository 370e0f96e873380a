//! Reference data cache (branches, ports, shipping methods, statuses)

use shared::models::{ReferenceKind, ReferenceOption};
use std::collections::HashMap;

use crate::error::ClientResult;
use crate::pool::CargoPool;

/// Per-session cache; each kind is fetched at most once on success
#[derive(Debug, Default)]
pub struct ReferenceCache {
    lists: HashMap<ReferenceKind, Vec<ReferenceOption>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `kind`, fetching it on first use
    pub async fn get<P>(&mut self, pool: &P, kind: ReferenceKind) -> ClientResult<&[ReferenceOption]>
    where
        P: CargoPool + ?Sized,
    {
        if !self.lists.contains_key(&kind) {
            let options = pool.fetch_reference(kind).await?;
            tracing::debug!(?kind, count = options.len(), "Reference list loaded");
            self.lists.insert(kind, options);
        }
        Ok(self.lists.get(&kind).map(Vec::as_slice).unwrap_or_default())
    }

    /// Load every kind not cached yet
    pub async fn preload<P>(&mut self, pool: &P) -> ClientResult<()>
    where
        P: CargoPool + ?Sized,
    {
        for kind in ReferenceKind::ALL {
            self.get(pool, kind).await?;
        }
        Ok(())
    }

    pub fn cached(&self, kind: ReferenceKind) -> Option<&[ReferenceOption]> {
        self.lists.get(&kind).map(Vec::as_slice)
    }

    /// Active options only, for populating selects
    pub fn active(&self, kind: ReferenceKind) -> Vec<&ReferenceOption> {
        self.cached(kind)
            .unwrap_or_default()
            .iter()
            .filter(|o| o.is_active)
            .collect()
    }

    /// Display name for an id, if the list is cached and contains it
    pub fn name_of(&self, kind: ReferenceKind, id: i64) -> Option<&str> {
        self.cached(kind)?
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.name.as_str())
    }
}
