pub mod file;
pub mod memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use society_core::TenantId;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::TenancyError;

/// Durable key/value medium behind the persisted selection.
///
/// Implementations may fail freely; `PersistentSelection` absorbs it.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// "Last selected tenant" slot under one fixed key.
///
/// Reads are served from an in-memory mirror. Writes go to the store
/// first and then to the mirror. The first store failure switches the
/// slot to memory-only for the rest of the process; nothing here
/// returns an error.
pub struct PersistentSelection {
    store: Arc<dyn SelectionStore>,
    key: String,
    current: RwLock<Option<TenantId>>,
    hydrated: OnceCell<()>,
    degraded: AtomicBool,
}

impl PersistentSelection {
    pub fn new(store: Arc<dyn SelectionStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            current: RwLock::new(None),
            hydrated: OnceCell::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Memory-only slot, as if storage were unavailable from the start.
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self {
            store: Arc::new(memory::MemorySelectionStore::new()),
            key: key.into(),
            current: RwLock::new(None),
            hydrated: OnceCell::new_with(Some(())),
            degraded: AtomicBool::new(true),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the durable value into memory.
    ///
    /// Only the first call hits the store; concurrent callers wait for it.
    pub async fn hydrate(&self) -> Option<TenantId> {
        self.hydrated
            .get_or_init(|| async {
                match self.store.load(&self.key).await {
                    Ok(value) => {
                        let value = value.filter(|v| !v.trim().is_empty()).map(TenantId::new);
                        debug!(key = %self.key, selection = ?value, "persisted selection hydrated");
                        *self.current.write() = value;
                    }
                    Err(e) => self.degrade(TenancyError::storage(e)),
                }
            })
            .await;
        self.get()
    }

    pub fn get(&self) -> Option<TenantId> {
        self.current.read().clone()
    }

    /// Store `id`. The mirror changes only once the store has answered,
    /// so a write dropped mid-flight leaves the previous value in place.
    pub async fn set(&self, id: &TenantId) {
        self.hydrate().await;
        if !self.is_degraded() {
            if let Err(e) = self.store.save(&self.key, id.as_str()).await {
                self.degrade(TenancyError::storage(e));
            }
        }
        *self.current.write() = Some(id.clone());
    }

    pub async fn clear(&self) {
        self.hydrate().await;
        if !self.is_degraded() {
            if let Err(e) = self.store.remove(&self.key).await {
                self.degrade(TenancyError::storage(e));
            }
        }
        *self.current.write() = None;
    }

    /// Whether the slot has fallen back to memory-only.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn degrade(&self, err: TenancyError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(key = %self.key, error = %err, "selection storage unavailable; keeping selection in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::memory::MemorySelectionStore;

    struct BrokenStore;

    #[async_trait]
    impl SelectionStore for BrokenStore {
        async fn load(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("storage disabled"))
        }
        async fn save(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("storage disabled"))
        }
        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("storage disabled"))
        }
    }

    #[tokio::test]
    async fn hydrate_reads_store_once() {
        let store = Arc::new(MemorySelectionStore::new());
        store.save("k", "society-3").await.unwrap();

        let selection = PersistentSelection::new(store.clone(), "k");
        assert_eq!(selection.get(), None);
        assert_eq!(selection.hydrate().await, Some(TenantId::new("society-3")));

        store.save("k", "society-9").await.unwrap();
        assert_eq!(selection.hydrate().await, Some(TenantId::new("society-3")));
    }

    #[tokio::test]
    async fn broken_store_degrades_to_memory() {
        let selection = PersistentSelection::new(Arc::new(BrokenStore), "k");

        assert_eq!(selection.hydrate().await, None);
        assert!(selection.is_degraded());

        selection.set(&TenantId::new("society-1")).await;
        assert_eq!(selection.get(), Some(TenantId::new("society-1")));

        selection.clear().await;
        assert_eq!(selection.get(), None);
    }

    struct StalledStore;

    #[async_trait]
    impl SelectionStore for StalledStore {
        async fn load(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(Some("society-1".to_string()))
        }
        async fn save(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            futures::future::pending().await
        }
        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_write_keeps_previous_value() {
        let selection = PersistentSelection::new(Arc::new(StalledStore), "k");
        selection.hydrate().await;

        let society_2 = TenantId::new("society-2");
        let write = selection.set(&society_2);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(50), write).await;

        assert!(timed_out.is_err());
        assert_eq!(selection.get(), Some(TenantId::new("society-1")));
        assert!(!selection.is_degraded());
    }

    #[tokio::test]
    async fn writes_reach_the_store() {
        let store = Arc::new(MemorySelectionStore::new());
        let selection = PersistentSelection::new(store.clone(), "k");

        selection.set(&TenantId::new("society-1")).await;
        assert_eq!(store.load("k").await.unwrap(), Some("society-1".to_string()));

        selection.clear().await;
        assert_eq!(store.load("k").await.unwrap(), None);
        assert_eq!(store.write_count(), 2);
    }
}
