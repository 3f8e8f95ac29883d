//! The resource/action catalog: the universe of (resource, action) pairs the
//! matrix builder enumerates
//!
//! Built once from metadata and validated at construction. Duplicate pairs
//! are dropped here so the matrix density invariant holds everywhere else.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One resource and the actions defined on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogResource {
    pub resource: String,
    pub actions: Vec<String>,
}

impl CatalogResource {
    pub fn new(resource: impl Into<String>, actions: &[&str]) -> Self {
        Self {
            resource: resource.into(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered, validated catalog of (resource, action) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    resources: Vec<CatalogResource>,
}

const DEFAULT_RESOURCES: &[&str] = &["users", "products", "categories", "roles"];
const DEFAULT_ACTIONS: &[&str] = &["view", "create", "update", "delete"];

impl Catalog {
    /// Build a catalog, dropping duplicate (resource, action) pairs.
    /// Entries for an already-seen resource are folded into the first one.
    pub fn new(entries: Vec<CatalogResource>) -> Self {
        let mut resources: Vec<CatalogResource> = Vec::new();
        for entry in entries {
            let idx = match resources.iter().position(|r| r.resource == entry.resource) {
                Some(i) => i,
                None => {
                    resources.push(CatalogResource {
                        resource: entry.resource.clone(),
                        actions: Vec::new(),
                    });
                    resources.len() - 1
                }
            };
            let slot = &mut resources[idx];
            for action in entry.actions {
                if slot.actions.contains(&action) {
                    warn!(resource = %entry.resource, action = %action,
                        "duplicate catalog pair dropped");
                } else {
                    slot.actions.push(action);
                }
            }
        }
        Self { resources }
    }

    /// The fixed fallback catalog used when no metadata is available
    pub fn default_set() -> Self {
        Self {
            resources: DEFAULT_RESOURCES
                .iter()
                .map(|r| CatalogResource::new(*r, DEFAULT_ACTIONS))
                .collect(),
        }
    }

    pub fn resources(&self) -> &[CatalogResource] {
        &self.resources
    }

    /// All (resource, action) pairs in catalog order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resources.iter().flat_map(|r| {
            r.actions.iter().map(move |a| (r.resource.as_str(), a.as_str()))
        })
    }

    /// Total number of (resource, action) pairs
    pub fn total_pairs(&self) -> usize {
        self.resources.iter().map(|r| r.actions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_pairs() == 0
    }
}
