pub mod navigation;
pub mod session;
pub mod state;

pub use navigation::{requested_tenant, tenant_path, GLOBAL_ROOT};
pub use session::{SessionSnapshot, SessionSource};
pub use state::{DirectoryFailure, Generation, ResolutionEvent, ResolutionState, SelectionOrigin};
