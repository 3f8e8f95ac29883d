//! Core data model: permissions, roles, and resolved permissions
//!
//! These are plain data carriers. All behavior lives in `resolve`, `merge`,
//! `matrix`, and `session`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single (resource, action) grant. Resource and action are opaque
/// identifiers drawn from the catalog; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self { resource: resource.into(), action: action.into() }
    }
}

/// A named role: its direct grants plus the parents it inherits from.
///
/// `inherits_from` is ordered (declaration order decides attribution
/// tie-breaks), may be empty, and may name roles that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub inherits_from: Vec<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), permissions: Vec::new(), inherits_from: Vec::new() }
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.inherits_from = parents;
        self
    }

    /// True if this role directly grants (resource, action)
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.resource == resource && p.action == action)
    }
}

/// Flat role collection keyed by role name. There is no global root.
pub type RoleSet = HashMap<String, Role>;

/// Build a `RoleSet` from a list of roles. Later duplicates replace earlier
/// ones, matching last-write-wins storage semantics.
pub fn role_set(roles: impl IntoIterator<Item = Role>) -> RoleSet {
    roles.into_iter().map(|r| (r.name.clone(), r)).collect()
}

/// The output unit of resolution: one (resource, action) cell with its grant
/// state and provenance.
///
/// Invariants: if `granted` is false, `inherited` is false and
/// `inherited_from` is `None`. If a permission is both direct and inherited,
/// `inherited` is false (direct wins in provenance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPermission {
    pub resource: String,
    pub action: String,
    pub granted: bool,
    pub inherited: bool,
    pub inherited_from: Option<String>,
}

impl ResolvedPermission {
    /// An explicitly granted, non-inherited cell
    pub fn direct(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            granted: true,
            inherited: false,
            inherited_from: None,
        }
    }

    /// A cell granted by inheritance from `from`
    pub fn inherited(
        resource: impl Into<String>,
        action: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            granted: true,
            inherited: true,
            inherited_from: Some(from.into()),
        }
    }

    /// A not-granted cell
    pub fn denied(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            granted: false,
            inherited: false,
            inherited_from: None,
        }
    }

    /// True if this cell covers (resource, action)
    pub fn covers(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }
}
