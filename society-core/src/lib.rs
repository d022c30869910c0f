//! society-core: shared types for the society operations console.

pub mod config;
pub mod errors;
pub mod tenant;

pub use config::{ConsoleConfig, ConsoleConfigSnapshot};
pub use errors::{ConsoleError, ErrorKind};
pub use tenant::{Profile, Role, Tenant, TenantId};
