//! Permission merger: direct grants, inherited grants, and the live oracle
//!
//! Combines a role's direct permissions with the walker's inherited closure
//! and, optionally, a permission set confirmed by the external authorization
//! oracle. Pure function of its inputs.
//!
//! The oracle is authoritative for presence only: a pair it reports is forced
//! to granted even if absent locally, but it never removes a locally declared
//! grant and never rewrites local provenance. This fails open toward local
//! declared state and is not suitable for enforcement outside a demo.

use crate::model::{Permission, ResolvedPermission, Role, RoleSet};
use crate::resolve::resolve_inherited;

/// Resolve one role's effective permissions, restricted to the pairs present
/// in its direct set, its inherited closure, or `live_truth`.
///
/// Direct grants always win in provenance: a pair that is both direct and
/// inherited comes out with `inherited = false`.
pub fn merge_role_permissions(
    role: &Role,
    roles: &RoleSet,
    live_truth: Option<&[Permission]>,
) -> Vec<ResolvedPermission> {
    let mut out: Vec<ResolvedPermission> = Vec::new();

    for p in &role.permissions {
        if !out.iter().any(|r| r.covers(&p.resource, &p.action)) {
            out.push(ResolvedPermission::direct(p.resource.clone(), p.action.clone()));
        }
    }

    for r in resolve_inherited(&role.name, roles) {
        if !out.iter().any(|e| e.covers(&r.resource, &r.action)) {
            out.push(r);
        }
    }

    if let Some(live) = live_truth {
        for p in live {
            if !out.iter().any(|r| r.covers(&p.resource, &p.action)) {
                out.push(ResolvedPermission::direct(p.resource.clone(), p.action.clone()));
            }
        }
    }

    out
}
