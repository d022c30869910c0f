//! Core multi-tenant types for the society console.
//!
//! A tenant is a "society": an isolated customer scope that owns residents,
//! bills, complaints and every other scoped record. These types are plain
//! snapshots; nothing here mutates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tenant (society) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PartialEq<str> for TenantId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TenantId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Immutable snapshot of a tenant as reported by the directory.
///
/// Identity is `id`; everything the directory sends beyond the
/// fields the console understands is kept in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub total_units: u32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Tenant {
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>, total_units: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_units,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Authorization role carried by an authenticated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-wide administrator; the top administrative role.
    SuperAdmin,
    Admin,
    Staff,
    Resident,
}

impl Role {
    pub fn is_top_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Resident => "resident",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(|c| c.to_lowercase())
            .collect();

        match normalized.as_str() {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "resident" => Ok(Role::Resident),
            _ => Err(anyhow::anyhow!("unknown role: {s}")),
        }
    }
}

/// Authenticated profile as produced by the session layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub default_tenant_id: Option<TenantId>,
}

impl Profile {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            default_tenant_id: None,
        }
    }

    pub fn with_default_tenant(mut self, tenant: impl Into<TenantId>) -> Self {
        self.default_tenant_id = Some(tenant.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parses_loose_spellings() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("SuperAdmin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!(" Resident ".parse::<Role>().unwrap(), Role::Resident);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn tenant_keeps_unknown_fields() {
        let tenant: Tenant = serde_json::from_value(json!({
            "id": "society-1",
            "name": "Green Acres",
            "totalUnits": 120,
            "city": "Pune"
        }))
        .unwrap();

        assert_eq!(tenant.id, "society-1");
        assert_eq!(tenant.total_units, 120);
        assert_eq!(tenant.attributes.get("city"), Some(&json!("Pune")));
    }

    #[test]
    fn profile_default_tenant_is_optional() {
        let profile: Profile =
            serde_json::from_value(json!({ "id": "u1", "role": "admin" })).unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert!(profile.default_tenant_id.is_none());
    }
}
