//! Detection strategies mapping the installed system menu to a region entry.

use super::{RegionTable, ResolvedLocator};
use crate::platform::storage::Storage;
use crate::platform::title::TitleIdentity;
use async_trait::async_trait;
use std::sync::Arc;

/// A detection strategy behind one capability interface.
///
/// Resolution never fails: an unknown configuration degrades to
/// [`ResolvedLocator::Unresolved`] and the caller gates on it.
#[async_trait]
pub trait DetectStrategy: Send + Sync {
    async fn resolve(&self, table: &RegionTable) -> ResolvedLocator;
}

/// Strategy 1: attempt to open each candidate asset for read, in table
/// order. The first that opens is the match; the rest stay untried.
pub struct ExistenceProbe {
    storage: Arc<dyn Storage>,
}

impl ExistenceProbe {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl DetectStrategy for ExistenceProbe {
    async fn resolve(&self, table: &RegionTable) -> ResolvedLocator {
        for entry in table.entries() {
            match self.storage.open_read(&entry.source_path).await {
                Ok(handle) => {
                    // Probe only; the handle is released immediately.
                    drop(handle);
                    tracing::debug!(region = %entry.region, "existence probe matched");
                    return ResolvedLocator::Resolved(entry.clone());
                }
                Err(err) => {
                    tracing::trace!(
                        region = %entry.region,
                        error = %err,
                        "candidate did not open"
                    );
                }
            }
        }

        tracing::debug!("no region candidate opened");
        ResolvedLocator::Unresolved
    }
}

/// Strategy 2: exact match on the installed menu title id. No I/O.
pub struct TitleLookup {
    identity: Arc<dyn TitleIdentity>,
}

impl TitleLookup {
    pub fn new(identity: Arc<dyn TitleIdentity>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl DetectStrategy for TitleLookup {
    async fn resolve(&self, table: &RegionTable) -> ResolvedLocator {
        let Some(id) = self.identity.installed_menu_title().await else {
            tracing::debug!("platform reports no installed menu title");
            return ResolvedLocator::Unresolved;
        };

        match table.entries().iter().find(|e| e.title_id == id) {
            Some(entry) => {
                tracing::debug!(region = %entry.region, title_id = id, "title id matched");
                ResolvedLocator::Resolved(entry.clone())
            }
            None => {
                tracing::debug!(title_id = id, "title id matched no known region");
                ResolvedLocator::Unresolved
            }
        }
    }
}

/// Region resolver: one strategy selected at construction, rerun before
/// every menu repaint.
pub struct RegionResolver {
    table: RegionTable,
    strategy: Box<dyn DetectStrategy>,
}

impl RegionResolver {
    pub fn new(table: RegionTable, strategy: Box<dyn DetectStrategy>) -> Self {
        Self { table, strategy }
    }

    pub async fn resolve(&self) -> ResolvedLocator {
        self.strategy.resolve(&self.table).await
    }
}
