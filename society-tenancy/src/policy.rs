use society_core::{Profile, Tenant};

/// Decides whether a profile may operate inside a tenant.
pub trait AccessPolicy: Send + Sync {
    fn has_access(&self, profile: &Profile, tenant: &Tenant) -> bool;
}

/// Grants every tenant to the top administrative role and nothing to
/// anyone else. There is no membership check.
// TODO: replace with a roster-based policy once tenant membership is exposed by the session layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnlyPolicy;

impl AccessPolicy for AdminOnlyPolicy {
    fn has_access(&self, profile: &Profile, _tenant: &Tenant) -> bool {
        profile.role.is_top_admin()
    }
}

impl<F> AccessPolicy for F
where
    F: Fn(&Profile, &Tenant) -> bool + Send + Sync,
{
    fn has_access(&self, profile: &Profile, tenant: &Tenant) -> bool {
        self(profile, tenant)
    }
}
