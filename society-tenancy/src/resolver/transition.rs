//! Pure resolution step.
//!
//! Everything the resolver knows at one instant goes in as
//! [`ResolutionInputs`]; one [`Decision`] comes out. No I/O, no clocks,
//! no interior state: identical inputs always yield identical decisions.

use society_core::{Tenant, TenantId};

use crate::directory::DirectorySnapshot;
use crate::policy::AccessPolicy;
use crate::types::{ResolutionState, SelectionOrigin, SessionSnapshot};

/// Snapshot of every input the transition reads.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInputs<'a> {
    /// Tenant named by navigation, `None` at the global root.
    pub requested_id: Option<&'a TenantId>,
    pub session: &'a SessionSnapshot,
    /// `None` until the directory has loaded once.
    pub directory: Option<&'a DirectorySnapshot>,
    pub persisted_id: Option<&'a TenantId>,
    /// Whether the persisted id may be used as a fallback.
    pub consult_persisted: bool,
    pub current_tenant: Option<&'a TenantId>,
    pub is_global_view: bool,
    /// Global view was explicitly requested.
    pub force_global: bool,
}

/// What the orchestrator should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Enter this state; nothing else to do.
    Settle(ResolutionState),
    /// The directory must load before `target` can be looked up.
    LoadDirectory { target: TenantId },
    /// Make `tenant` current, persist it, then enter `Ready`.
    Switch {
        from: Option<TenantId>,
        tenant: Tenant,
        origin: SelectionOrigin,
    },
}

/// Evaluate the transition rules top to bottom; the first match wins.
pub fn resolve(inputs: &ResolutionInputs<'_>, policy: &dyn AccessPolicy) -> Decision {
    if inputs.session.is_loading {
        return Decision::Settle(ResolutionState::AwaitingProfile);
    }
    let Some(profile) = inputs.session.profile.as_ref() else {
        return Decision::Settle(ResolutionState::Idle);
    };
    if inputs.force_global {
        return Decision::Settle(ResolutionState::global());
    }

    let persisted = inputs.persisted_id.filter(|_| inputs.consult_persisted);
    if inputs.requested_id.is_none() && persisted.is_none() {
        return Decision::Settle(ResolutionState::global());
    }

    // The profile's default tenant never gets a say: with nothing requested
    // and nothing persisted the check above has already settled global.
    let (effective_id, origin) = match (inputs.requested_id, persisted) {
        (Some(id), _) => (id, SelectionOrigin::Navigation),
        (None, Some(id)) => (id, SelectionOrigin::Persisted),
        (None, None) => return Decision::Settle(ResolutionState::global()),
    };

    let Some(directory) = inputs.directory else {
        return Decision::LoadDirectory {
            target: effective_id.clone(),
        };
    };

    let Some(tenant) = directory.find_by_id(effective_id) else {
        return Decision::Settle(ResolutionState::NotFound {
            id: effective_id.clone(),
        });
    };

    if !policy.has_access(profile, tenant) {
        return Decision::Settle(ResolutionState::AccessDenied {
            id: effective_id.clone(),
            tenant_name: Some(tenant.name.clone()),
        });
    }

    if inputs.current_tenant == Some(&tenant.id) && !inputs.is_global_view {
        return Decision::Settle(ResolutionState::scoped(tenant.clone(), origin));
    }

    Decision::Switch {
        from: inputs.current_tenant.cloned(),
        tenant: tenant.clone(),
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::AdminOnlyPolicy;
    use society_core::{Profile, Role};

    fn directory() -> DirectorySnapshot {
        DirectorySnapshot::new(vec![
            Tenant::new("society-1", "Green Acres", 120),
            Tenant::new("society-2", "Lake View", 48),
            Tenant::new("society-3", "Palm Court", 64),
        ])
    }

    fn admin() -> SessionSnapshot {
        SessionSnapshot::authenticated(Profile::new("u-admin", Role::SuperAdmin))
    }

    fn inputs<'a>(
        requested: Option<&'a TenantId>,
        session: &'a SessionSnapshot,
        directory: Option<&'a DirectorySnapshot>,
        persisted: Option<&'a TenantId>,
    ) -> ResolutionInputs<'a> {
        ResolutionInputs {
            requested_id: requested,
            session,
            directory,
            persisted_id: persisted,
            consult_persisted: true,
            current_tenant: None,
            is_global_view: false,
            force_global: false,
        }
    }

    #[test]
    fn loading_profile_waits() {
        let session = SessionSnapshot::loading();
        let id = TenantId::new("society-1");
        let decision = resolve(&inputs(Some(&id), &session, None, None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::Settle(ResolutionState::AwaitingProfile));
    }

    #[test]
    fn signed_out_session_is_idle() {
        let session = SessionSnapshot::signed_out();
        let decision = resolve(&inputs(None, &session, None, None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::Settle(ResolutionState::Idle));
    }

    #[test]
    fn nothing_requested_nothing_persisted_is_global() {
        let session = admin();
        let decision = resolve(&inputs(None, &session, None, None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::Settle(ResolutionState::global()));
    }

    #[test]
    fn profile_default_alone_does_not_leave_global_root() {
        let session = SessionSnapshot::authenticated(
            Profile::new("u", Role::SuperAdmin).with_default_tenant("society-2"),
        );
        let dir = directory();
        let decision = resolve(&inputs(None, &session, Some(&dir), None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::Settle(ResolutionState::global()));
    }

    #[test]
    fn persisted_beats_profile_default() {
        let session = SessionSnapshot::authenticated(
            Profile::new("u", Role::SuperAdmin).with_default_tenant("society-2"),
        );
        let dir = directory();
        let persisted = TenantId::new("society-3");

        match resolve(&inputs(None, &session, Some(&dir), Some(&persisted)), &AdminOnlyPolicy) {
            Decision::Switch { tenant, origin, .. } => {
                assert_eq!(tenant.id, "society-3");
                assert_eq!(origin, SelectionOrigin::Persisted);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn navigation_wins_over_persisted() {
        let session = admin();
        let dir = directory();
        let requested = TenantId::new("society-2");
        let persisted = TenantId::new("society-1");

        let decision = resolve(
            &inputs(Some(&requested), &session, Some(&dir), Some(&persisted)),
            &AdminOnlyPolicy,
        );

        match decision {
            Decision::Switch { tenant, origin, .. } => {
                assert_eq!(tenant.id, "society-2");
                assert_eq!(origin, SelectionOrigin::Navigation);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn persisted_is_the_fallback() {
        let session = admin();
        let dir = directory();
        let persisted = TenantId::new("society-3");

        let decision = resolve(&inputs(None, &session, Some(&dir), Some(&persisted)), &AdminOnlyPolicy);

        match decision {
            Decision::Switch { tenant, origin, from } => {
                assert_eq!(tenant.id, "society-3");
                assert_eq!(origin, SelectionOrigin::Persisted);
                assert_eq!(from, None);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn persisted_ignored_after_initial_load() {
        let session = admin();
        let dir = directory();
        let persisted = TenantId::new("society-3");
        let mut snapshot = inputs(None, &session, Some(&dir), Some(&persisted));
        snapshot.consult_persisted = false;

        assert_eq!(
            resolve(&snapshot, &AdminOnlyPolicy),
            Decision::Settle(ResolutionState::global())
        );
    }

    #[test]
    fn unloaded_directory_requests_a_load() {
        let session = admin();
        let id = TenantId::new("society-1");
        let decision = resolve(&inputs(Some(&id), &session, None, None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::LoadDirectory { target: id.clone() });
    }

    #[test]
    fn unknown_id_is_not_found() {
        let session = admin();
        let dir = directory();
        let id = TenantId::new("does-not-exist");
        let decision = resolve(&inputs(Some(&id), &session, Some(&dir), None), &AdminOnlyPolicy);
        assert_eq!(decision, Decision::Settle(ResolutionState::NotFound { id: id.clone() }));
    }

    #[test]
    fn denied_role_carries_tenant_name() {
        let session = SessionSnapshot::authenticated(Profile::new("u-res", Role::Resident));
        let dir = directory();
        let id = TenantId::new("society-2");
        let decision = resolve(&inputs(Some(&id), &session, Some(&dir), None), &AdminOnlyPolicy);
        assert_eq!(
            decision,
            Decision::Settle(ResolutionState::AccessDenied {
                id: id.clone(),
                tenant_name: Some("Lake View".to_string()),
            })
        );
    }

    #[test]
    fn already_current_tenant_takes_the_fast_path() {
        let session = admin();
        let dir = directory();
        let id = TenantId::new("society-1");
        let mut snapshot = inputs(Some(&id), &session, Some(&dir), None);
        snapshot.current_tenant = Some(&id);

        match resolve(&snapshot, &AdminOnlyPolicy) {
            Decision::Settle(ResolutionState::Ready {
                tenant: Some(t),
                is_global_view: false,
                ..
            }) => assert_eq!(t.id, "society-1"),
            other => panic!("expected ready, got {other:?}"),
        }

        snapshot.is_global_view = true;
        assert!(matches!(
            resolve(&snapshot, &AdminOnlyPolicy),
            Decision::Switch { .. }
        ));
    }

    #[test]
    fn forced_global_beats_everything_but_loading() {
        let session = admin();
        let dir = directory();
        let id = TenantId::new("society-1");
        let mut snapshot = inputs(Some(&id), &session, Some(&dir), Some(&id));
        snapshot.force_global = true;
        assert_eq!(
            resolve(&snapshot, &AdminOnlyPolicy),
            Decision::Settle(ResolutionState::global())
        );
    }

    #[test]
    fn same_inputs_same_decision() {
        let session = admin();
        let dir = directory();
        let requested = TenantId::new("society-2");
        let persisted = TenantId::new("society-1");
        let snapshot = inputs(Some(&requested), &session, Some(&dir), Some(&persisted));

        let first = resolve(&snapshot, &AdminOnlyPolicy);
        for _ in 0..10 {
            assert_eq!(resolve(&snapshot, &AdminOnlyPolicy), first);
        }
    }
}
