use society_core::Profile;

/// Snapshot of the session layer as seen by the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub profile: Option<Profile>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    /// Session layer has not answered yet.
    pub fn loading() -> Self {
        Self {
            profile: None,
            is_loading: true,
        }
    }

    pub fn authenticated(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            is_loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            profile: None,
            is_loading: false,
        }
    }
}

/// Anything that can report the current session.
///
/// `TenantResolver::sync_session` pulls from it; pushes go through
/// `TenantResolver::update_session`.
pub trait SessionSource: Send + Sync {
    fn snapshot(&self) -> SessionSnapshot;
}

impl SessionSource for SessionSnapshot {
    fn snapshot(&self) -> SessionSnapshot {
        self.clone()
    }
}
