use std::sync::Arc;

use parking_lot::Mutex;
use society_core::{Tenant, TenantId};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::config::ResolverConfig;
use crate::directory::TenantDirectory;
use crate::policy::{AccessPolicy, AdminOnlyPolicy};
use crate::resolver::transition::{resolve, Decision, ResolutionInputs};
use crate::selection::{PersistentSelection, SelectionStore};
use crate::types::{
    requested_tenant, DirectoryFailure, Generation, ResolutionEvent, ResolutionState,
    SelectionOrigin, SessionSnapshot, SessionSource,
};
use crate::view::RecoveryAction;
use crate::{TenancyError, TenancyResult};

/// Mutable resolver state. Only ever touched under the core lock, and
/// the lock is never held across an await point.
#[derive(Debug)]
struct ResolverCore {
    state: ResolutionState,
    generation: Generation,
    requested_id: Option<TenantId>,
    session: SessionSnapshot,
    current_tenant: Option<Tenant>,
    is_global_view: bool,
    force_global: bool,
    consult_persisted: bool,
    directory_failures: u32,
}

impl ResolverCore {
    fn new() -> Self {
        Self {
            state: ResolutionState::Idle,
            generation: Generation::default(),
            requested_id: None,
            session: SessionSnapshot::loading(),
            current_tenant: None,
            is_global_view: false,
            force_global: false,
            consult_persisted: true,
            directory_failures: 0,
        }
    }

    fn bump(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }
}

struct Inner {
    core: Mutex<ResolverCore>,
    directory: TenantDirectory,
    selection: PersistentSelection,
    policy: Arc<dyn AccessPolicy>,
    config: ResolverConfig,
    events: broadcast::Sender<ResolutionEvent>,
    // Serializes persistence writes so a superseded switch cannot land last.
    write_lane: tokio::sync::Mutex<()>,
}

/// Builder for [`TenantResolver`]
pub struct TenantResolverBuilder {
    directory: TenantDirectory,
    store: Option<Arc<dyn SelectionStore>>,
    policy: Arc<dyn AccessPolicy>,
    config: ResolverConfig,
}

impl TenantResolverBuilder {
    /// Durable medium for the persisted selection. Without one the
    /// selection lives in memory only.
    pub fn selection_store(mut self, store: Arc<dyn SelectionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TenantResolver {
        let selection = match self.store {
            Some(store) => PersistentSelection::new(store, self.config.selection_key.clone()),
            None => PersistentSelection::in_memory(self.config.selection_key.clone()),
        };
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));

        TenantResolver {
            inner: Arc::new(Inner {
                core: Mutex::new(ResolverCore::new()),
                directory: self.directory,
                selection,
                policy: self.policy,
                config: self.config,
                events,
                write_lane: tokio::sync::Mutex::new(()),
            }),
        }
    }
}

/// Owns the answer to "which society is current".
///
/// Every input change goes through one of the public operations. Each
/// operation stamps a new [`Generation`] and re-runs the transition from
/// the top; work finishing under an older generation is dropped instead
/// of applied, so the latest input always wins.
#[derive(Clone)]
pub struct TenantResolver {
    inner: Arc<Inner>,
}

impl TenantResolver {
    pub fn builder(directory: TenantDirectory) -> TenantResolverBuilder {
        TenantResolverBuilder {
            directory,
            store: None,
            policy: Arc::new(AdminOnlyPolicy),
            config: ResolverConfig::default(),
        }
    }

    // ──────────────────────────────────────────────────────────────
    // Read side
    // ──────────────────────────────────────────────────────────────

    pub fn state(&self) -> ResolutionState {
        self.inner.core.lock().state.clone()
    }

    pub fn generation(&self) -> Generation {
        self.inner.core.lock().generation
    }

    pub fn current_tenant(&self) -> Option<Tenant> {
        self.inner.core.lock().current_tenant.clone()
    }

    pub fn is_global_view(&self) -> bool {
        self.inner.core.lock().is_global_view
    }

    pub fn directory(&self) -> &TenantDirectory {
        &self.inner.directory
    }

    pub fn selection(&self) -> &PersistentSelection {
        &self.inner.selection
    }

    /// Every state published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ResolutionEvent> {
        self.inner.events.subscribe()
    }

    // ──────────────────────────────────────────────────────────────
    // Inputs
    // ──────────────────────────────────────────────────────────────

    /// The session layer reported a new snapshot.
    #[instrument(skip(self, session), fields(loading = session.is_loading, authenticated = session.profile.is_some()))]
    pub async fn update_session(&self, session: SessionSnapshot) -> ResolutionState {
        let generation = {
            let mut core = self.inner.core.lock();
            core.session = session;
            core.bump()
        };
        self.drive(generation).await
    }

    /// Pull a fresh snapshot from `source`, e.g. when the shell remounts.
    pub async fn sync_session(&self, source: &dyn SessionSource) -> ResolutionState {
        self.update_session(source.snapshot()).await
    }

    /// Navigation moved to `path`.
    #[instrument(skip(self))]
    pub async fn navigate(&self, path: &str) -> ResolutionState {
        let requested = requested_tenant(path);
        let generation = {
            let mut core = self.inner.core.lock();
            if requested.is_some() {
                core.force_global = false;
            }
            core.requested_id = requested;
            core.bump()
        };
        self.drive(generation).await
    }

    /// Explicit switch from a tenant picker.
    pub async fn switch_tenant(&self, id: impl Into<TenantId>) -> ResolutionState {
        self.switch_to(id.into()).await
    }

    #[instrument(skip(self, id), fields(tenant_id = %id))]
    async fn switch_to(&self, id: TenantId) -> ResolutionState {
        let generation = {
            let mut core = self.inner.core.lock();
            core.requested_id = Some(id);
            core.force_global = false;
            core.bump()
        };
        self.drive(generation).await
    }

    /// Enter (`true`) or leave (`false`) the cross-tenant view.
    ///
    /// Entering clears the persisted selection.
    #[instrument(skip(self))]
    pub async fn set_global_view(&self, enabled: bool) -> ResolutionState {
        let generation = {
            let mut core = self.inner.core.lock();
            core.force_global = enabled;
            if enabled {
                core.requested_id = None;
                core.consult_persisted = false;
            } else {
                core.consult_persisted = true;
            }
            core.bump()
        };

        if enabled {
            let _lane = self.inner.write_lane.lock().await;
            let persisted = self.inner.selection.hydrate().await;
            if persisted.is_some() && !self.is_stale(generation) {
                self.inner.selection.clear().await;
            }
        }
        self.drive(generation).await
    }

    /// Re-run resolution after `NotFound`, `AccessDenied` or `DirectoryError`.
    #[instrument(skip(self))]
    pub async fn retry(&self) -> TenancyResult<ResolutionState> {
        let generation = {
            let mut core = self.inner.core.lock();
            if !core.state.is_retryable() {
                return Err(TenancyError::InvalidRetry {
                    state: core.state.name(),
                });
            }
            core.bump()
        };
        Ok(self.drive(generation).await)
    }

    /// Drop the cached directory and resolve again from scratch.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ResolutionState {
        self.inner.directory.invalidate();
        let generation = {
            let mut core = self.inner.core.lock();
            core.directory_failures = 0;
            core.bump()
        };
        self.drive(generation).await
    }

    /// Forget the persisted selection and go to the global root.
    pub async fn clear_selection(&self) -> ResolutionState {
        self.set_global_view(true).await
    }

    /// Carry out a recovery action offered by an error panel.
    pub async fn perform(&self, action: RecoveryAction) -> TenancyResult<ResolutionState> {
        match action {
            RecoveryAction::TryAgain => self.retry().await,
            RecoveryAction::Refresh => Ok(self.refresh().await),
            RecoveryAction::GoToGlobalView => Ok(self.navigate(crate::types::GLOBAL_ROOT).await),
            RecoveryAction::ClearSelectionAndGoHome => Ok(self.clear_selection().await),
            RecoveryAction::ContactAdministrator => Ok(self.state()),
        }
    }

    /// Tear down on sign-out. The persisted selection survives.
    pub fn sign_out(&self) {
        let mut core = self.inner.core.lock();
        core.bump();
        core.session = SessionSnapshot::signed_out();
        core.requested_id = None;
        core.current_tenant = None;
        core.is_global_view = false;
        core.force_global = false;
        core.consult_persisted = true;
        core.directory_failures = 0;
        self.publish(&mut core, ResolutionState::Idle);
        info!("signed out; tenant resolution reset");
    }

    // ──────────────────────────────────────────────────────────────
    // Orchestration
    // ──────────────────────────────────────────────────────────────

    fn is_stale(&self, generation: Generation) -> bool {
        self.inner.core.lock().generation != generation
    }

    fn publish(&self, core: &mut ResolverCore, state: ResolutionState) {
        debug!(generation = %core.generation, state = %state, "resolution state");
        core.state = state.clone();
        // No receivers is fine.
        let _ = self.inner.events.send(ResolutionEvent {
            generation: core.generation,
            state,
        });
    }

    /// Publish a transient state for `generation` unless superseded.
    fn announce(&self, generation: Generation, state: ResolutionState) {
        let mut core = self.inner.core.lock();
        if core.generation == generation {
            self.publish(&mut core, state);
        }
    }

    /// Apply a settled state for `generation`, or drop it if superseded.
    fn settle(&self, generation: Generation, state: ResolutionState) -> ResolutionState {
        let mut core = self.inner.core.lock();
        if core.generation != generation {
            debug!(%generation, current = %core.generation, dropped = %state, "discarding stale resolution");
            return core.state.clone();
        }

        match &state {
            ResolutionState::Ready {
                is_global_view: true,
                ..
            } => {
                core.current_tenant = None;
                core.is_global_view = true;
                core.consult_persisted = false;
            }
            ResolutionState::Ready { .. } => {
                core.consult_persisted = false;
            }
            ResolutionState::Idle => {
                core.current_tenant = None;
                core.is_global_view = false;
            }
            _ => {}
        }

        match &state {
            ResolutionState::Ready { .. } => info!(state = %state, "tenant resolved"),
            ResolutionState::NotFound { .. } | ResolutionState::AccessDenied { .. } => {
                warn!(state = %state, "tenant resolution refused")
            }
            _ => {}
        }

        self.publish(&mut core, state);
        core.state.clone()
    }

    async fn drive(&self, generation: Generation) -> ResolutionState {
        self.inner.selection.hydrate().await;

        loop {
            let decision = {
                let core = self.inner.core.lock();
                if core.generation != generation {
                    return core.state.clone();
                }
                let directory = self.inner.directory.snapshot();
                let persisted = self.inner.selection.get();
                let inputs = ResolutionInputs {
                    requested_id: core.requested_id.as_ref(),
                    session: &core.session,
                    directory: directory.as_deref(),
                    persisted_id: persisted.as_ref(),
                    consult_persisted: core.consult_persisted,
                    current_tenant: core.current_tenant.as_ref().map(|t| &t.id),
                    is_global_view: core.is_global_view,
                    force_global: core.force_global,
                };
                resolve(&inputs, self.inner.policy.as_ref())
            };

            match decision {
                Decision::Settle(state) => return self.settle(generation, state),
                Decision::LoadDirectory { target } => {
                    if let Some(state) = self.load_directory(generation, &target).await {
                        return state;
                    }
                }
                Decision::Switch {
                    from,
                    tenant,
                    origin,
                } => return self.switch(generation, from, tenant, origin).await,
            }
        }
    }

    /// Load the directory for `generation`, auto-retrying per config.
    ///
    /// `None` means the directory is now loaded and resolution should
    /// continue; `Some` is the state to return to the caller.
    async fn load_directory(
        &self,
        generation: Generation,
        target: &TenantId,
    ) -> Option<ResolutionState> {
        let mut auto_retries = 0;
        loop {
            self.announce(generation, ResolutionState::LoadingDirectory);

            let outcome = self.inner.directory.load().await;
            if self.is_stale(generation) {
                debug!(%generation, "dropping directory result for superseded generation");
                return Some(self.state());
            }

            let err = match outcome {
                Ok(_) => {
                    self.inner.core.lock().directory_failures = 0;
                    self.announce(
                        generation,
                        ResolutionState::Resolving {
                            target_id: target.clone(),
                        },
                    );
                    return None;
                }
                Err(err) => err,
            };

            let failures = {
                let mut core = self.inner.core.lock();
                core.directory_failures += 1;
                core.directory_failures
            };

            if auto_retries < self.inner.config.auto_retry_limit {
                auto_retries += 1;
                warn!(error = %err, attempt = auto_retries, "directory load failed; retrying");
                tokio::time::sleep(self.inner.config.retry_delay).await;
                if self.is_stale(generation) {
                    return Some(self.state());
                }
                continue;
            }

            warn!(error = %err, failures, "directory load failed; giving up");
            let message = match err {
                TenancyError::DirectoryUnavailable(message) => message,
                other => other.to_string(),
            };
            return Some(self.settle(
                generation,
                ResolutionState::DirectoryError {
                    retry_count: failures.saturating_sub(1),
                    cause: DirectoryFailure::LoadFailed(message),
                },
            ));
        }
    }

    async fn switch(
        &self,
        generation: Generation,
        from: Option<TenantId>,
        tenant: Tenant,
        origin: SelectionOrigin,
    ) -> ResolutionState {
        let previous = {
            let mut core = self.inner.core.lock();
            if core.generation != generation {
                return core.state.clone();
            }
            self.publish(
                &mut core,
                ResolutionState::Switching {
                    from,
                    to: tenant.id.clone(),
                },
            );
            let previous = (core.current_tenant.take(), core.is_global_view);
            core.current_tenant = Some(tenant.clone());
            core.is_global_view = false;
            previous
        };

        let persist = async {
            let _lane = self.inner.write_lane.lock().await;
            if self.is_stale(generation) {
                return;
            }
            if self.inner.selection.get().as_ref() != Some(&tenant.id) {
                self.inner.selection.set(&tenant.id).await;
            }
        };

        // A cancelled write leaves the persisted selection at its old value.
        let timeout = self.inner.config.switch_timeout;
        if tokio::time::timeout(timeout, persist).await.is_err() {
            warn!(tenant_id = %tenant.id, error = %TenancyError::SwitchTimeout(timeout), "rolling back tenant switch");
            let retry_count = {
                let mut core = self.inner.core.lock();
                if core.generation == generation {
                    core.current_tenant = previous.0;
                    core.is_global_view = previous.1;
                }
                core.directory_failures
            };
            return self.settle(
                generation,
                ResolutionState::DirectoryError {
                    retry_count,
                    cause: DirectoryFailure::SwitchTimeout,
                },
            );
        }

        self.settle(generation, ResolutionState::scoped(tenant, origin))
    }
}
