use society_core::TenantId;

/// Path segment that introduces a tenant-scoped route.
pub const TENANT_SEGMENT: &str = "tenant";

/// Path of the cross-tenant root.
pub const GLOBAL_ROOT: &str = "/";

/// Extract the requested tenant id from a navigated path.
///
/// `/tenant/{id}/...` yields `Some(id)`; anything else is the global root.
/// Query strings and fragments are ignored.
pub fn requested_tenant(path: &str) -> Option<TenantId> {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(TENANT_SEGMENT), Some(id)) => Some(TenantId::new(id)),
        _ => None,
    }
}

/// Scoped landing path for a tenant.
pub fn tenant_path(id: &TenantId) -> String {
    format!("/{TENANT_SEGMENT}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tenant_from_scoped_paths() {
        assert_eq!(requested_tenant("/tenant/society-2"), Some(TenantId::new("society-2")));
        assert_eq!(
            requested_tenant("/tenant/society-2/residents?page=3"),
            Some(TenantId::new("society-2"))
        );
        assert_eq!(requested_tenant("tenant/s1/"), Some(TenantId::new("s1")));
    }

    #[test]
    fn everything_else_is_global() {
        assert_eq!(requested_tenant("/"), None);
        assert_eq!(requested_tenant(""), None);
        assert_eq!(requested_tenant("/tenant"), None);
        assert_eq!(requested_tenant("/tenant/"), None);
        assert_eq!(requested_tenant("/reports/tenant/s1"), None);
    }

    #[test]
    fn tenant_path_round_trips() {
        let id = TenantId::new("society-7");
        assert_eq!(requested_tenant(&tenant_path(&id)), Some(id));
    }
}
