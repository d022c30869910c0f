pub mod memory;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use society_core::{Tenant, TenantId};
use tracing::{debug, info, warn};

use crate::{TenancyError, TenancyResult};

/// Network boundary for the tenant directory.
///
/// One call returns the full list of tenants the platform knows about,
/// or fails. The wire format is the implementor's business.
#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Tenant>>;
}

/// Immutable result of one successful directory load.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    tenants: Vec<Tenant>,
    by_id: HashMap<TenantId, usize>,
}

impl DirectorySnapshot {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        let by_id = tenants
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        Self { tenants, by_id }
    }

    pub fn find_by_id(&self, id: &TenantId) -> Option<&Tenant> {
        self.by_id.get(id).map(|&idx| &self.tenants[idx])
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

type LoadOutcome = TenancyResult<Arc<DirectorySnapshot>>;
type LoadFuture = Shared<BoxFuture<'static, LoadOutcome>>;

#[derive(Default)]
struct DirectoryState {
    snapshot: Option<Arc<DirectorySnapshot>>,
    in_flight: Option<(u64, LoadFuture)>,
}

/// Loads and caches the tenant list.
///
/// `load` is single-flight: callers arriving while a fetch is running
/// await that same fetch. A failed fetch leaves nothing cached, so the
/// next `load` goes back to the backend. Retry policy belongs to the caller.
#[derive(Clone)]
pub struct TenantDirectory {
    backend: Arc<dyn DirectoryBackend>,
    state: Arc<Mutex<DirectoryState>>,
    tickets: Arc<AtomicU64>,
}

impl TenantDirectory {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(DirectoryState::default())),
            tickets: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Load the directory, reusing the cached snapshot or an in-flight fetch.
    pub async fn load(&self) -> LoadOutcome {
        let (ticket, fut) = {
            let mut state = self.state.lock();
            if let Some(snapshot) = &state.snapshot {
                return Ok(snapshot.clone());
            }
            match &state.in_flight {
                Some((ticket, fut)) => {
                    debug!(ticket, "joining in-flight directory load");
                    (*ticket, fut.clone())
                }
                None => {
                    let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
                    let backend = self.backend.clone();
                    let fut = async move {
                        backend
                            .fetch_all()
                            .await
                            .map(|tenants| Arc::new(DirectorySnapshot::new(tenants)))
                            .map_err(TenancyError::directory)
                    }
                    .boxed()
                    .shared();
                    debug!(ticket, "starting directory load");
                    state.in_flight = Some((ticket, fut.clone()));
                    (ticket, fut)
                }
            }
        };

        let outcome = fut.await;

        let mut state = self.state.lock();
        let current = matches!(&state.in_flight, Some((t, _)) if *t == ticket);
        if current {
            state.in_flight = None;
            match &outcome {
                Ok(snapshot) => {
                    info!(tenants = snapshot.len(), "tenant directory loaded");
                    state.snapshot = Some(snapshot.clone());
                }
                Err(e) => warn!(error = %e, "tenant directory load failed"),
            }
        }
        outcome
    }

    /// Whether a load has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().snapshot.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    pub fn snapshot(&self) -> Option<Arc<DirectorySnapshot>> {
        self.state.lock().snapshot.clone()
    }

    /// Look up a tenant in the last successfully loaded snapshot.
    pub fn find_by_id(&self, id: &TenantId) -> Option<Tenant> {
        self.state
            .lock()
            .snapshot
            .as_ref()
            .and_then(|s| s.find_by_id(id).cloned())
    }

    /// Drop the cached snapshot; the next `load` refetches.
    ///
    /// A fetch still in flight finishes for its waiters but is not cached.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.snapshot = None;
        state.in_flight = None;
        debug!("tenant directory invalidated");
    }
}
