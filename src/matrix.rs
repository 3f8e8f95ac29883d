//! Dense permission matrix builder
//!
//! Applies the merger across the full catalog cross-product for every role.
//! The output is dense on purpose: one cell per (resource, action) pair per
//! role, in catalog order, with explicit not-granted cells. A consumer can
//! render or iterate a row without ever checking for missing entries, and a
//! role with no usable data still yields a well-formed all-false row.

use std::collections::HashMap;

use tracing::warn;

use crate::catalog::Catalog;
use crate::merge::merge_role_permissions;
use crate::model::{Permission, ResolvedPermission, RoleSet};

/// Per-role permission sets confirmed by the live authorization oracle
pub type LiveTruth = HashMap<String, Vec<Permission>>;

/// Build the dense matrix for every role in `roles`.
///
/// Each row has exactly `catalog.total_pairs()` cells in catalog order. An
/// empty catalog falls back to [`Catalog::default_set`] with a warning.
pub fn build_matrix(
    roles: &RoleSet,
    catalog: &Catalog,
) -> HashMap<String, Vec<ResolvedPermission>> {
    build_matrix_with(roles, catalog, &LiveTruth::new())
}

/// Like [`build_matrix`], additionally merging per-role oracle answers
pub fn build_matrix_with(
    roles: &RoleSet,
    catalog: &Catalog,
    live: &LiveTruth,
) -> HashMap<String, Vec<ResolvedPermission>> {
    let fallback;
    let catalog = if catalog.is_empty() {
        warn!("catalog is empty, falling back to the default resource/action set");
        fallback = Catalog::default_set();
        &fallback
    } else {
        catalog
    };

    let mut matrix = HashMap::with_capacity(roles.len());
    for role in roles.values() {
        let merged = merge_role_permissions(role, roles, live.get(&role.name).map(|v| v.as_slice()));
        let row = catalog
            .pairs()
            .map(|(resource, action)| {
                merged
                    .iter()
                    .find(|r| r.covers(resource, action))
                    .cloned()
                    .unwrap_or_else(|| ResolvedPermission::denied(resource, action))
            })
            .collect();
        matrix.insert(role.name.clone(), row);
    }
    matrix
}
