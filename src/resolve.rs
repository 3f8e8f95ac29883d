//! Inheritance graph walker
//!
//! Role inheritance is a general directed graph over role names: a role may
//! list several parents, and user-edited data can introduce cycles. The walk
//! carries a visited set per path (copied on branch) so a cycle on one branch
//! of a diamond never prunes its sibling, and terminates because every
//! recursive call grows its own visited set.

use std::collections::HashSet;

use tracing::warn;

use crate::model::{ResolvedPermission, RoleSet};

/// Compute the full transitive closure of inherited permissions for `name`.
///
/// Each (resource, action) pair appears at most once, attributed to the
/// ancestor that directly grants it; when several ancestors grant the same
/// pair, the first one discovered in `inherits_from` declaration order wins.
/// Cycles and parents that do not resolve are skipped with a warning.
///
/// A role on a cycle sees its own direct grants echoed back attributed to
/// itself; the merger relabels those as direct.
pub fn resolve_inherited(name: &str, roles: &RoleSet) -> Vec<ResolvedPermission> {
    walk(name, roles, &HashSet::new())
}

fn walk<'a>(name: &str, roles: &'a RoleSet, visited: &HashSet<&'a str>) -> Vec<ResolvedPermission> {
    if visited.contains(name) {
        warn!(role = %name, "inheritance cycle detected, skipping");
        return Vec::new();
    }
    // Unknown roles expand to nothing; dangling parents are tolerated.
    let Some(role) = roles.get(name) else {
        return Vec::new();
    };

    let mut visited = visited.clone();
    visited.insert(role.name.as_str());

    let mut acc: Vec<ResolvedPermission> = Vec::new();
    for parent_name in &role.inherits_from {
        match roles.get(parent_name) {
            Some(parent) => {
                // Nearest grants first: the parent's own permissions, then its
                // ancestors. First writer wins, so an attribution set by a
                // closer ancestor is never overwritten.
                for p in &parent.permissions {
                    if !acc.iter().any(|r| r.covers(&p.resource, &p.action)) {
                        acc.push(ResolvedPermission::inherited(
                            p.resource.clone(),
                            p.action.clone(),
                            parent_name.clone(),
                        ));
                    }
                }
                for r in walk(parent_name, roles, &visited) {
                    if !acc.iter().any(|e| e.covers(&r.resource, &r.action)) {
                        acc.push(r);
                    }
                }
            }
            None => {
                warn!(role = %name, parent = %parent_name, "parent role not found, skipping");
            }
        }
    }
    acc
}
