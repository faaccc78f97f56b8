use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::{repo::PostStore, repo_types::PostSummary};

pub type Snapshot = Arc<Vec<PostSummary>>;

/// Process-local copy of the post list.
///
/// Reads share an immutable snapshot. A rebuild holds the write lock for
/// the whole clear-and-rescan, so readers either see the old snapshot or
/// wait for the new one and never observe a half-built list.
#[derive(Default)]
pub struct PostCache {
    entries: RwLock<Option<Snapshot>>,
}

impl PostCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached list, scanning the store and keeping the result on a miss.
    pub async fn get(&self, store: &dyn PostStore) -> anyhow::Result<Snapshot> {
        if let Some(hit) = self.entries.read().await.as_ref() {
            debug!(entries = hit.len(), "post cache hit");
            return Ok(Arc::clone(hit));
        }

        let mut guard = self.entries.write().await;
        // another miss may have filled it while we waited for the lock
        if let Some(hit) = guard.as_ref() {
            return Ok(Arc::clone(hit));
        }
        let fresh: Snapshot = Arc::new(store.list().await?);
        debug!(entries = fresh.len(), "post cache miss, populated");
        *guard = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Drops the current snapshot and rebuilds it from the store.
    ///
    /// On a failed rescan the cache is left empty and the next `get` retries.
    pub async fn refresh(&self, store: &dyn PostStore) -> anyhow::Result<Snapshot> {
        let mut guard = self.entries.write().await;
        *guard = None;
        let fresh: Snapshot = Arc::new(store.list().await?);
        debug!(entries = fresh.len(), "post cache rebuilt");
        *guard = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    #[cfg(test)]
    pub async fn is_populated(&self) -> bool {
        self.entries.read().await.is_some()
    }
}
