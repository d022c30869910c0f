//! # Errors
//!
//! Structured console errors shared by every crate in the workspace.
//! - stable status codes + names + class names
//! - can be carried through `anyhow::Error` across async trait boundaries
//! - transport-agnostic (the shell decides how to show them)

use std::fmt;

use anyhow::Error as AnyError;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Error classes surfaced to the console shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    Forbidden,        // 403
    NotFound,         // 404
    Timeout,          // 408
    GeneralError,     // 500
    BadGateway,       // 502
    Unavailable,      // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Timeout => 408,
            ErrorKind::GeneralError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::Unavailable => 503,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::Unavailable => "Unavailable",
        }
    }

    /// Kebab-cased class name, handy for styling hooks in the shell.
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::BadGateway => "bad-gateway",
            ErrorKind::Unavailable => "unavailable",
        }
    }

    /// Whether the condition may clear up on its own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::BadGateway | ErrorKind::Unavailable
        )
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A structured console error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct ConsoleError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
    pub source: Option<AnyError>,
}

impl ConsoleError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it crosses trait boundaries intact.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Turn any error into a ConsoleError:
    /// - if it's already a ConsoleError, keep it
    /// - otherwise wrap as `fallback`
    pub fn normalize(err: AnyError, fallback: ErrorKind) -> ConsoleError {
        match err.downcast::<ConsoleError>() {
            Ok(console) => console,
            Err(other) => ConsoleError::new(fallback, format!("{other:#}")).with_source(other),
        }
    }

    pub fn to_json(&self) -> Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_console_errors() {
        let err = ConsoleError::unavailable("directory down").into_anyhow();
        let normalized = ConsoleError::normalize(err, ErrorKind::GeneralError);
        assert_eq!(normalized.kind, ErrorKind::Unavailable);
        assert_eq!(normalized.message, "directory down");
    }

    #[test]
    fn normalize_wraps_foreign_errors() {
        let err = anyhow::anyhow!("connection reset");
        let normalized = ConsoleError::normalize(err, ErrorKind::BadGateway);
        assert_eq!(normalized.kind, ErrorKind::BadGateway);
        assert!(normalized.source.is_some());
        assert!(normalized.message.contains("connection reset"));
    }

    #[test]
    fn json_payload_has_stable_shape() {
        let body = ConsoleError::new(ErrorKind::Forbidden, "no access")
            .with_data(serde_json::json!({ "tenantId": "s-9" }))
            .to_json();
        assert_eq!(body["name"], "Forbidden");
        assert_eq!(body["code"], 403);
        assert_eq!(body["className"], "forbidden");
        assert_eq!(body["data"]["tenantId"], "s-9");
    }

    #[test]
    fn only_infrastructure_kinds_are_transient() {
        assert!(ErrorKind::Unavailable.is_transient());
        assert!(ErrorKind::Timeout.is_transient());
        assert!(!ErrorKind::NotFound.is_transient());
        assert!(!ErrorKind::Forbidden.is_transient());
    }
}
