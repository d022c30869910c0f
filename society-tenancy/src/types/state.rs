use std::fmt;

use serde::Serialize;
use society_core::{Tenant, TenantId};

/// Monotonic tag stamped on every resolution attempt.
///
/// Work started under an older generation is dropped when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the tenant of a `Ready` state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
    /// The navigated path named the tenant.
    Navigation,
    /// Restored from the persisted selection on initial load.
    Persisted,
    /// No tenant; cross-tenant view.
    Global,
}

/// Why a `DirectoryError` state was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum DirectoryFailure {
    LoadFailed(String),
    SwitchTimeout,
}

/// The single authoritative description of where tenant selection stands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionState {
    #[default]
    Idle,
    AwaitingProfile,
    LoadingDirectory,
    Resolving {
        target_id: TenantId,
    },
    Switching {
        from: Option<TenantId>,
        to: TenantId,
    },
    /// `tenant` is `Some` exactly when `is_global_view` is false.
    Ready {
        tenant: Option<Tenant>,
        is_global_view: bool,
        origin: SelectionOrigin,
    },
    NotFound {
        id: TenantId,
    },
    AccessDenied {
        id: TenantId,
        tenant_name: Option<String>,
    },
    DirectoryError {
        retry_count: u32,
        cause: DirectoryFailure,
    },
}

impl ResolutionState {
    pub fn global() -> Self {
        Self::Ready {
            tenant: None,
            is_global_view: true,
            origin: SelectionOrigin::Global,
        }
    }

    pub fn scoped(tenant: Tenant, origin: SelectionOrigin) -> Self {
        Self::Ready {
            tenant: Some(tenant),
            is_global_view: false,
            origin,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingProfile => "awaiting_profile",
            Self::LoadingDirectory => "loading_directory",
            Self::Resolving { .. } => "resolving",
            Self::Switching { .. } => "switching",
            Self::Ready { .. } => "ready",
            Self::NotFound { .. } => "not_found",
            Self::AccessDenied { .. } => "access_denied",
            Self::DirectoryError { .. } => "directory_error",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// States `retry()` may be called from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::AccessDenied { .. } | Self::DirectoryError { .. }
        )
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            Self::Ready { tenant, .. } => tenant.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving { target_id } => write!(f, "resolving({target_id})"),
            Self::Switching { from, to } => match from {
                Some(from) => write!(f, "switching({from} -> {to})"),
                None => write!(f, "switching(-> {to})"),
            },
            Self::Ready {
                tenant: Some(t), ..
            } => write!(f, "ready({})", t.id),
            Self::Ready { tenant: None, .. } => write!(f, "ready(global)"),
            Self::NotFound { id } => write!(f, "not_found({id})"),
            Self::AccessDenied { id, .. } => write!(f, "access_denied({id})"),
            Self::DirectoryError { retry_count, .. } => {
                write!(f, "directory_error(retries={retry_count})")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// A published transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEvent {
    pub generation: Generation,
    pub state: ResolutionState,
}
