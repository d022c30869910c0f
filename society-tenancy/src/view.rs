//! Maps a [`ResolutionState`] to what the shell should put on screen.

use serde::Serialize;
use serde_json::{json, Value};
use society_core::{ConsoleError, ErrorKind, Tenant, TenantId};

use crate::types::{tenant_path, DirectoryFailure, ResolutionState, SelectionOrigin};

/// Why a loading indicator is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "tenant_id", rename_all = "snake_case")]
pub enum LoadingReason {
    Initializing,
    Profile,
    Directory,
    Resolving(TenantId),
    Switching(TenantId),
}

/// A button on an error panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    TryAgain,
    Refresh,
    GoToGlobalView,
    ContactAdministrator,
    ClearSelectionAndGoHome,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TryAgain => "Try Again",
            Self::Refresh => "Refresh",
            Self::GoToGlobalView => "Go to Global View",
            Self::ContactAdministrator => "Contact Administrator",
            Self::ClearSelectionAndGoHome => "Clear Selection & Go Home",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "render", rename_all = "snake_case")]
pub enum RenderDecision {
    Loading {
        reason: LoadingReason,
    },
    ErrorPanel {
        kind: ErrorKind,
        title: String,
        message: String,
        actions: Vec<RecoveryAction>,
    },
    Redirect {
        path: String,
        reason: Option<String>,
    },
    Content {
        tenant: Option<Tenant>,
        is_global_view: bool,
    },
}

impl RenderDecision {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// JSON body for an error panel: the console error shape (`name`,
    /// `code`, `className`, `message`) with the title and actions under `data`.
    pub fn error_body(&self) -> Option<Value> {
        match self {
            Self::ErrorPanel {
                kind,
                title,
                message,
                actions,
            } => {
                let data = json!({
                    "title": title,
                    "actions": actions,
                });
                Some(
                    ConsoleError::new(*kind, message.clone())
                        .with_data(data)
                        .to_json(),
                )
            }
            _ => None,
        }
    }

    /// Recovery actions offered, empty unless this is an error panel.
    pub fn actions(&self) -> &[RecoveryAction] {
        match self {
            Self::ErrorPanel { actions, .. } => actions,
            _ => &[],
        }
    }
}

/// Stateless renderer. Every state maps to exactly one decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewController;

impl ViewController {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &ResolutionState) -> RenderDecision {
        match state {
            ResolutionState::Idle => loading(LoadingReason::Initializing),
            ResolutionState::AwaitingProfile => loading(LoadingReason::Profile),
            ResolutionState::LoadingDirectory => loading(LoadingReason::Directory),
            ResolutionState::Resolving { target_id } => {
                loading(LoadingReason::Resolving(target_id.clone()))
            }
            ResolutionState::Switching { to, .. } => loading(LoadingReason::Switching(to.clone())),

            ResolutionState::Ready {
                tenant: Some(tenant),
                origin: SelectionOrigin::Persisted,
                ..
            } => RenderDecision::Redirect {
                path: tenant_path(&tenant.id),
                reason: Some("restored selection".to_string()),
            },
            ResolutionState::Ready {
                tenant,
                is_global_view,
                ..
            } => RenderDecision::Content {
                tenant: tenant.clone(),
                is_global_view: *is_global_view,
            },

            ResolutionState::NotFound { id } => RenderDecision::ErrorPanel {
                kind: ErrorKind::NotFound,
                title: "Society not found".to_string(),
                message: format!(
                    "No society with id \"{id}\" exists. It may have been removed, or the link may be wrong."
                ),
                actions: vec![RecoveryAction::GoToGlobalView],
            },
            ResolutionState::AccessDenied { id, tenant_name } => {
                let name = tenant_name.as_deref().unwrap_or(id.as_str());
                RenderDecision::ErrorPanel {
                    kind: ErrorKind::Forbidden,
                    title: "Access denied".to_string(),
                    message: format!(
                        "You do not have permission to manage {name}. Ask an administrator for access."
                    ),
                    actions: vec![
                        RecoveryAction::ContactAdministrator,
                        RecoveryAction::ClearSelectionAndGoHome,
                    ],
                }
            }
            ResolutionState::DirectoryError { retry_count, cause } => {
                let (kind, title, detail) = match cause {
                    DirectoryFailure::LoadFailed(reason) => (
                        ErrorKind::Unavailable,
                        "Couldn't load societies",
                        reason.clone(),
                    ),
                    DirectoryFailure::SwitchTimeout => (
                        ErrorKind::Timeout,
                        "Switching took too long",
                        "The society switch did not finish in time.".to_string(),
                    ),
                };
                let message = if *retry_count > 0 {
                    format!("{detail} (failed after {} attempts)", retry_count + 1)
                } else {
                    detail
                };
                RenderDecision::ErrorPanel {
                    kind,
                    title: title.to_string(),
                    message,
                    actions: vec![RecoveryAction::TryAgain, RecoveryAction::Refresh],
                }
            }
        }
    }
}

fn loading(reason: LoadingReason) -> RenderDecision {
    RenderDecision::Loading { reason }
}
