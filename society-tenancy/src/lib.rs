//! # society-tenancy
//!
//! Decides which society (tenant) the console is operating on.
//!
//! - **Pure transition**: [`resolve`] maps one snapshot of inputs to one
//!   decision, so the rules can be tested without a runtime
//! - **Race-free orchestration**: [`TenantResolver`] stamps every input
//!   change with a generation and drops results from superseded work
//! - **Single-flight directory**: [`TenantDirectory`] shares one fetch
//!   between concurrent callers
//! - **Degrading persistence**: [`PersistentSelection`] keeps working in
//!   memory when its store fails
//! - **View mapping**: [`ViewController`] turns a state into a render decision
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use society_tenancy::prelude::*;
//!
//! # async fn run() {
//! let backend = Arc::new(StaticDirectoryBackend::new(vec![
//!     Tenant::new("society-1", "Green Acres", 120),
//! ]));
//! let resolver = TenantResolver::builder(TenantDirectory::new(backend))
//!     .selection_store(Arc::new(MemorySelectionStore::new()))
//!     .build();
//!
//! resolver
//!     .update_session(SessionSnapshot::authenticated(Profile::new("u-1", Role::SuperAdmin)))
//!     .await;
//! let state = resolver.navigate("/tenant/society-1/residents").await;
//! let decision = ViewController.render(&state);
//! # let _ = decision;
//! # }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod observability;
pub mod policy;
pub mod resolver;
pub mod selection;
pub mod types;
pub mod view;

pub use config::{ResolverConfig, SELECTION_KEY};
pub use directory::memory::StaticDirectoryBackend;
pub use directory::{DirectoryBackend, DirectorySnapshot, TenantDirectory};
pub use error::{TenancyError, TenancyResult};
pub use policy::{AccessPolicy, AdminOnlyPolicy};
pub use resolver::{resolve, Decision, ResolutionInputs, TenantResolver, TenantResolverBuilder};
pub use selection::file::FileSelectionStore;
pub use selection::memory::MemorySelectionStore;
pub use selection::{PersistentSelection, SelectionStore};
pub use types::{
    requested_tenant, tenant_path, DirectoryFailure, Generation, ResolutionEvent,
    ResolutionState, SelectionOrigin, SessionSnapshot, SessionSource, GLOBAL_ROOT,
};
pub use view::{LoadingReason, RecoveryAction, RenderDecision, ViewController};

#[cfg(feature = "subscriber")]
pub use observability::init_tracing;

/// Everything needed to wire a resolver into a shell
pub mod prelude {
    pub use crate::{
        AccessPolicy, AdminOnlyPolicy, DirectoryBackend, MemorySelectionStore,
        ResolutionState, ResolverConfig, SelectionStore, SessionSnapshot,
        StaticDirectoryBackend, TenancyError, TenancyResult, TenantDirectory, TenantResolver,
    };

    pub use crate::{RecoveryAction, RenderDecision, ViewController};

    pub use society_core::{Profile, Role, Tenant, TenantId};

    pub use async_trait::async_trait;
}
