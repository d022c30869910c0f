//! Tenant resolution: the pure transition plus the async orchestrator
//! that feeds it.

mod engine;
mod transition;

pub use engine::{TenantResolver, TenantResolverBuilder};
pub use transition::{resolve, Decision, ResolutionInputs};
