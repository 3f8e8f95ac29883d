//! Inheritance walker and merger tests
//!
//! Covers acyclic closure, cycle safety, diamond attribution, and the merge
//! rules for direct grants and the live oracle.

use rolematrix::{merge_role_permissions, resolve_inherited, role_set, Permission, Role, RoleSet};

fn perm(resource: &str, action: &str) -> Permission {
    Permission::new(resource, action)
}

fn role(name: &str, perms: &[(&str, &str)], parents: &[&str]) -> Role {
    Role::new(name)
        .with_permissions(perms.iter().map(|(r, a)| perm(r, a)).collect())
        .with_parents(parents.iter().map(|p| p.to_string()).collect())
}

fn pairs(resolved: &[rolematrix::ResolvedPermission]) -> Vec<(String, String)> {
    resolved.iter().map(|r| (r.resource.clone(), r.action.clone())).collect()
}

fn assert_no_duplicates(resolved: &[rolematrix::ResolvedPermission]) {
    let mut seen = pairs(resolved);
    seen.sort();
    let len = seen.len();
    seen.dedup();
    assert_eq!(seen.len(), len, "duplicate (resource, action) pair in result");
}

// ============================================================================
// Acyclic graphs
// ============================================================================

/// The inherited closure of an acyclic chain is the union of every transitive
/// ancestor's direct permissions, each exactly once
#[test]
fn acyclic_chain_full_closure() {
    let roles: RoleSet = role_set([
        role("customer", &[("products", "view")], &[]),
        role("moderator", &[("products", "create")], &["customer"]),
        role("admin", &[], &["moderator"]),
    ]);

    let resolved = resolve_inherited("admin", &roles);
    assert_no_duplicates(&resolved);
    let mut got = pairs(&resolved);
    got.sort();
    assert_eq!(
        got,
        vec![
            ("products".to_string(), "create".to_string()),
            ("products".to_string(), "view".to_string()),
        ]
    );
}

/// A role with no parents inherits nothing
#[test]
fn no_parents_no_inheritance() {
    let roles = role_set([role("lone", &[("products", "view")], &[])]);
    assert!(resolve_inherited("lone", &roles).is_empty());
}

/// Resolving an unknown role name yields an empty closure
#[test]
fn unknown_role_resolves_empty() {
    let roles = role_set([role("a", &[("products", "view")], &[])]);
    assert!(resolve_inherited("ghost", &roles).is_empty());
}

/// Parents that do not resolve are skipped, not fatal
#[test]
fn missing_parent_skipped() {
    let roles = role_set([
        role("a", &[("products", "view")], &[]),
        role("b", &[], &["ghost", "a"]),
    ]);

    let resolved = resolve_inherited("b", &roles);
    assert_eq!(pairs(&resolved), vec![("products".to_string(), "view".to_string())]);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("a"));
}

// ============================================================================
// Cycles
// ============================================================================

/// A two-role cycle terminates with no duplication. Each role picks up the
/// other's grant, plus its own echoed back through the cycle; the merger
/// relabels the echo as direct.
#[test]
fn two_role_cycle_terminates() {
    let roles = role_set([
        role("a", &[("products", "view")], &["b"]),
        role("b", &[("products", "create")], &["a"]),
    ]);

    let from_a = resolve_inherited("a", &roles);
    assert_no_duplicates(&from_a);
    let create = from_a.iter().find(|r| r.covers("products", "create")).unwrap();
    assert_eq!(create.inherited_from.as_deref(), Some("b"));
    let echo = from_a.iter().find(|r| r.covers("products", "view")).unwrap();
    assert_eq!(echo.inherited_from.as_deref(), Some("a"));

    // Direct wins once merged, so the echo never surfaces as inherited
    let merged = merge_role_permissions(&roles["a"], &roles, None);
    let view = merged.iter().find(|r| r.covers("products", "view")).unwrap();
    assert!(!view.inherited);
    assert_eq!(view.inherited_from, None);
}

/// A role naming itself as parent terminates; the self-edge is cut on the
/// recursive step
#[test]
fn self_cycle_terminates() {
    let roles = role_set([role("a", &[("products", "view")], &["a"])]);

    let resolved = resolve_inherited("a", &roles);
    assert_no_duplicates(&resolved);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("a"));

    let merged = merge_role_permissions(&roles["a"], &roles, None);
    assert_eq!(merged.len(), 1);
    assert!(merged[0].granted && !merged[0].inherited);
}

/// A longer cycle (a -> b -> c -> a) terminates and deduplicates
#[test]
fn three_role_cycle_terminates() {
    let roles = role_set([
        role("a", &[("users", "view")], &["b"]),
        role("b", &[("users", "create")], &["c"]),
        role("c", &[("users", "delete")], &["a"]),
    ]);

    let resolved = resolve_inherited("a", &roles);
    assert_no_duplicates(&resolved);
    let mut got = pairs(&resolved);
    got.sort();
    assert_eq!(
        got,
        vec![
            ("users".to_string(), "create".to_string()),
            ("users".to_string(), "delete".to_string()),
            ("users".to_string(), "view".to_string()),
        ]
    );
}

/// A cycle confined to one branch must not prune the sibling branch
#[test]
fn cycle_in_one_branch_does_not_block_sibling() {
    let roles = role_set([
        role("d", &[], &["b", "c"]),
        role("b", &[], &["x"]),
        role("x", &[("users", "view")], &["b"]),
        role("c", &[], &["a"]),
        role("a", &[("products", "view")], &[]),
    ]);

    let resolved = resolve_inherited("d", &roles);
    assert_no_duplicates(&resolved);
    let mut got = pairs(&resolved);
    got.sort();
    assert_eq!(
        got,
        vec![
            ("products".to_string(), "view".to_string()),
            ("users".to_string(), "view".to_string()),
        ]
    );
}

// ============================================================================
// Diamond attribution
// ============================================================================

/// When two parents both directly grant the same pair, the parent listed
/// first in `inherits_from` wins the attribution
#[test]
fn diamond_first_listed_parent_wins() {
    let shared = &[("products", "view")];
    let roles = role_set([
        role("d", &[], &["b", "c"]),
        role("b", shared, &[]),
        role("c", shared, &[]),
    ]);
    let resolved = resolve_inherited("d", &roles);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("b"));

    let flipped = role_set([
        role("d", &[], &["c", "b"]),
        role("b", shared, &[]),
        role("c", shared, &[]),
    ]);
    let resolved = resolve_inherited("d", &flipped);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("c"));
}

/// A permission granted only at the top of a diamond is attributed to the
/// role that directly grants it, and both branches reach it exactly once
#[test]
fn diamond_origin_attribution() {
    let roles = role_set([
        role("d", &[], &["b", "c"]),
        role("b", &[], &["a"]),
        role("c", &[], &["a"]),
        role("a", &[("products", "view")], &[]),
    ]);

    let resolved = resolve_inherited("d", &roles);
    assert_no_duplicates(&resolved);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("a"));
    assert!(resolved[0].inherited);
}

/// A closer ancestor's grant is not overwritten by a deeper one
#[test]
fn closer_ancestor_attribution_wins() {
    let roles = role_set([
        role("c", &[], &["b"]),
        role("b", &[("products", "view")], &["a"]),
        role("a", &[("products", "view")], &[]),
    ]);

    let resolved = resolve_inherited("c", &roles);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].inherited_from.as_deref(), Some("b"));
}

// ============================================================================
// Merger
// ============================================================================

/// A pair that is both direct and inherited resolves as direct
#[test]
fn direct_overrides_inherited() {
    let roles = role_set([
        role("child", &[("products", "view")], &["parent"]),
        role("parent", &[("products", "view")], &[]),
    ]);

    assert!(roles["child"].grants("products", "view"));
    assert!(!roles["child"].grants("products", "delete"));

    let merged = merge_role_permissions(&roles["child"], &roles, None);
    assert_eq!(merged.len(), 1);
    assert!(merged[0].granted);
    assert!(!merged[0].inherited);
    assert_eq!(merged[0].inherited_from, None);
}

/// The merger is restricted to direct and inherited pairs; it does not
/// enumerate any catalog
#[test]
fn merger_emits_only_known_pairs() {
    let roles = role_set([
        role("child", &[("products", "create")], &["parent"]),
        role("parent", &[("products", "view")], &[]),
    ]);

    let merged = merge_role_permissions(&roles["child"], &roles, None);
    let mut got = pairs(&merged);
    got.sort();
    assert_eq!(
        got,
        vec![
            ("products".to_string(), "create".to_string()),
            ("products".to_string(), "view".to_string()),
        ]
    );
}

/// The oracle adds pairs absent locally as explicit grants
#[test]
fn live_truth_adds_presence() {
    let roles = role_set([role("viewer", &[("products", "view")], &[])]);
    let live = vec![perm("products", "update")];

    let merged = merge_role_permissions(&roles["viewer"], &roles, Some(&live));
    let added = merged.iter().find(|r| r.covers("products", "update")).unwrap();
    assert!(added.granted);
    assert!(!added.inherited);
    assert_eq!(added.inherited_from, None);
}

/// The oracle never rewrites local provenance when both agree
#[test]
fn live_truth_keeps_local_provenance() {
    let roles = role_set([
        role("child", &[], &["parent"]),
        role("parent", &[("products", "view")], &[]),
    ]);
    let live = vec![perm("products", "view")];

    let merged = merge_role_permissions(&roles["child"], &roles, Some(&live));
    assert_eq!(merged.len(), 1);
    assert!(merged[0].inherited);
    assert_eq!(merged[0].inherited_from.as_deref(), Some("parent"));
}

/// The oracle never removes a locally declared grant
#[test]
fn live_truth_never_removes() {
    let roles = role_set([role("editor", &[("products", "view"), ("products", "update")], &[])]);
    // Oracle only confirms one of the two local grants
    let live = vec![perm("products", "view")];

    let merged = merge_role_permissions(&roles["editor"], &roles, Some(&live));
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().all(|r| r.granted));
}
