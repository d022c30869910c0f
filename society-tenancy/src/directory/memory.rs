use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use society_core::{ConsoleError, Tenant};

use super::DirectoryBackend;

/// In-memory directory backend for embedding and tests
pub struct StaticDirectoryBackend {
    tenants: RwLock<Vec<Tenant>>,
    fetches: AtomicUsize,
    failures_pending: AtomicUsize,
}

impl StaticDirectoryBackend {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self {
            tenants: RwLock::new(tenants),
            fetches: AtomicUsize::new(0),
            failures_pending: AtomicUsize::new(0),
        }
    }

    /// Replace the tenant list served by later fetches.
    pub fn replace(&self, tenants: Vec<Tenant>) {
        *self.tenants.write() = tenants;
    }

    /// Make the next `count` fetches fail as unavailable.
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Number of fetches served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for StaticDirectoryBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl DirectoryBackend for StaticDirectoryBackend {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Tenant>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ConsoleError::unavailable("tenant directory unavailable").into_anyhow());
        }

        Ok(self.tenants.read().clone())
    }
}
