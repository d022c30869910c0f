use std::time::Duration;

use society_core::{ConsoleError, ErrorKind};
use thiserror::Error;

/// Result type for tenancy operations
pub type TenancyResult<T> = Result<T, TenancyError>;

/// Errors raised while resolving the current tenant.
///
/// Cloneable so a single directory load can hand the same outcome
/// to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenancyError {
    #[error("Tenant directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Tenant not found: {id}")]
    TenantNotFound { id: String },

    #[error("Access denied to tenant {id}")]
    AccessDenied {
        id: String,
        tenant_name: Option<String>,
    },

    #[error("Selection storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Tenant switch did not settle within {0:?}")]
    SwitchTimeout(Duration),

    #[error("Retry is not allowed from state {state}")]
    InvalidRetry { state: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TenancyError {
    pub fn directory(err: anyhow::Error) -> Self {
        let console = ConsoleError::normalize(err, ErrorKind::Unavailable);
        Self::DirectoryUnavailable(console.message)
    }

    pub fn storage(err: anyhow::Error) -> Self {
        Self::StorageUnavailable(format!("{err:#}"))
    }

    /// Transient infrastructure failures; domain errors never are.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_transient()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DirectoryUnavailable(_) | Self::StorageUnavailable(_) => ErrorKind::Unavailable,
            Self::TenantNotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::Forbidden,
            Self::SwitchTimeout(_) => ErrorKind::Timeout,
            Self::InvalidRetry { .. } => ErrorKind::BadRequest,
            Self::Internal(_) => ErrorKind::GeneralError,
        }
    }

    pub fn into_console_error(self) -> ConsoleError {
        ConsoleError::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_error_keeps_console_message() {
        let err = TenancyError::directory(ConsoleError::new(ErrorKind::BadGateway, "upstream 502").into_anyhow());
        assert_eq!(err, TenancyError::DirectoryUnavailable("upstream 502".to_string()));
        assert!(err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn domain_errors_are_not_retryable() {
        let not_found = TenancyError::TenantNotFound { id: "x".into() };
        let denied = TenancyError::AccessDenied {
            id: "x".into(),
            tenant_name: None,
        };
        assert!(!not_found.is_retryable());
        assert!(!denied.is_retryable());
        assert_eq!(denied.into_console_error().code(), 403);
    }
}
