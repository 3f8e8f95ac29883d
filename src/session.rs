//! Edit session: an editable view over one matrix snapshot
//!
//! Wraps the matrix builder's output for a single editing lifetime. Toggling
//! a cell always converts it to an explicit (non-inherited) state, because a
//! user action is by definition an explicit override. The session owns its
//! state exclusively; concurrent toggles must be serialized by the caller.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::matrix::build_matrix;
use crate::model::{ResolvedPermission, RoleSet};

/// A per-consumer editable permission matrix with discard-to-baseline
#[derive(Debug)]
pub struct EditSession {
    roles: RoleSet,
    catalog: Catalog,
    matrix: HashMap<String, Vec<ResolvedPermission>>,
    editable: bool,
    dirty: bool,
}

impl EditSession {
    /// Build a read-only session from a roles/catalog snapshot
    pub fn new(roles: RoleSet, catalog: Catalog) -> Self {
        let matrix = build_matrix(&roles, &catalog);
        Self { roles, catalog, matrix, editable: false, dirty: false }
    }

    /// Enable or disable editing. Leaving edit mode does not discard edits.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// True once any toggle has been applied since the last baseline
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current (possibly edited) matrix
    pub fn matrix(&self) -> &HashMap<String, Vec<ResolvedPermission>> {
        &self.matrix
    }

    /// One role's row, if the role exists in the snapshot
    pub fn row(&self, role: &str) -> Option<&[ResolvedPermission]> {
        self.matrix.get(role).map(|r| r.as_slice())
    }

    /// Set one cell to an explicit granted/denied state.
    ///
    /// Errors with [`Error::NotEditable`] outside edit mode and
    /// [`Error::InvalidToggleTarget`] when the cell is not in the matrix.
    pub fn toggle(&mut self, role: &str, resource: &str, action: &str, granted: bool) -> Result<()> {
        if !self.editable {
            return Err(Error::NotEditable);
        }
        let cell = self
            .matrix
            .get_mut(role)
            .and_then(|row| row.iter_mut().find(|c| c.covers(resource, action)))
            .ok_or_else(|| Error::InvalidToggleTarget {
                role: role.to_string(),
                resource: resource.to_string(),
                action: action.to_string(),
            })?;
        *cell = if granted {
            ResolvedPermission::direct(resource, action)
        } else {
            ResolvedPermission::denied(resource, action)
        };
        self.dirty = true;
        Ok(())
    }

    /// Drop all toggles and recompute from the held snapshot
    pub fn discard(&mut self) {
        self.matrix = build_matrix(&self.roles, &self.catalog);
        self.dirty = false;
    }

    /// Replace the snapshot and recompute. Pending toggles are dropped.
    pub fn refresh(&mut self, roles: RoleSet, catalog: Catalog) {
        self.roles = roles;
        self.catalog = catalog;
        self.discard();
    }
}
