//! Rolematrix - role permission resolution with inheritance provenance
//!
//! Resolves a flat set of roles (direct grants plus ordered parent links,
//! cycles tolerated) into dense, provenance-tagged permission matrices, with
//! an optional live-oracle merge and an editable session on top. Roles and
//! the resource catalog can be held in the LMDB-backed [`store`] or handed in
//! from anywhere else.

pub mod catalog;
pub mod error;
pub mod matrix;
pub mod merge;
pub mod model;
pub mod resolve;
pub mod session;
pub mod store;

pub use catalog::{Catalog, CatalogResource};
pub use error::{Error, Result};
pub use matrix::{build_matrix, build_matrix_with, LiveTruth};
pub use merge::merge_role_permissions;
pub use model::{role_set, Permission, ResolvedPermission, Role, RoleSet};
pub use resolve::resolve_inherited;
pub use session::EditSession;
