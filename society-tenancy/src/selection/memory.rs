use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::SelectionStore;

/// Process-local selection store
#[derive(Default)]
pub struct MemorySelectionStore {
    values: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` and `remove` calls seen.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SelectionStore for MemorySelectionStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.write().remove(key);
        Ok(())
    }
}
