//! Tests for leaf reconciliation
//!
//! After reconciliation every scalar sits on the deepest branch that contains
//! it, and no branch holds both child branches and scalars of its own.

use mibgen::domain::{Access, DomainError, Forest, ObjectDescriptor, Oid};

fn oid(s: &str) -> Oid {
    Oid::from_dotted(s).expect("valid oid")
}

fn branch(name: &str, dotted: &str) -> ObjectDescriptor {
    ObjectDescriptor::branch(name, oid(dotted))
}

fn scalar(name: &str, dotted: &str) -> ObjectDescriptor {
    ObjectDescriptor::scalar(name, oid(dotted), Access::ReadWrite, "")
}

fn parent_of<'a>(forest: &'a Forest, dotted: &str) -> Option<&'a str> {
    forest
        .find(&oid(dotted))
        .and_then(|v| v.parent)
        .map(|p| p.name.as_str())
}

#[test]
fn given_leaf_attached_above_its_branch_when_reconciling_then_moves_to_deepest_branch() {
    // Arrange: x is attached to a before b exists
    let mut forest = Forest::build(vec![
        branch("a", "1.1"),
        scalar("x", "1.1.5.9"),
        branch("b", "1.1.5"),
    ])
    .expect("build");
    assert_eq!(parent_of(&forest, "1.1.5.9"), Some("a"));

    // Act
    forest.reconcile().expect("reconcile");

    // Assert
    assert_eq!(parent_of(&forest, "1.1.5.9"), Some("b"));
    let a = forest.roots()[0].as_branch().expect("branch");
    assert!(a.leaves().is_empty());
}

#[test]
fn given_leaf_outside_every_child_branch_when_reconciling_then_unpinned_leaves_error() {
    // Arrange
    let mut forest = Forest::build(vec![
        branch("a", "1.1"),
        scalar("x", "1.1.9"),
        branch("b", "1.1.5"),
    ])
    .expect("build");

    // Act
    let err = forest.reconcile().expect_err("x has no home");

    // Assert
    match err {
        DomainError::UnpinnedLeaves { branch, leaves } => {
            assert_eq!(branch, "a");
            assert_eq!(leaves, vec!["x (1.1.9)".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_leaves_several_levels_deep_when_reconciling_then_each_lands_on_its_deepest_branch() {
    // Arrange: all leaves are parked on the root before the branches arrive
    let mut forest = Forest::build(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        scalar("rxBytes", "1.3.6.1.4.1.9999.2.5.1"),
        scalar("cpuLoad", "1.3.6.1.4.1.9999.2.6.1"),
        scalar("fanSpeed", "1.3.6.1.4.1.9999.2.6.2"),
        branch("stats", "1.3.6.1.4.1.9999.2"),
        branch("ports", "1.3.6.1.4.1.9999.2.5"),
        branch("system", "1.3.6.1.4.1.9999.2.6"),
    ])
    .expect("build");

    // Act
    forest.reconcile().expect("reconcile");

    // Assert
    assert_eq!(parent_of(&forest, "1.3.6.1.4.1.9999.2.5.1"), Some("ports"));
    assert_eq!(parent_of(&forest, "1.3.6.1.4.1.9999.2.6.1"), Some("system"));
    assert_eq!(parent_of(&forest, "1.3.6.1.4.1.9999.2.6.2"), Some("system"));
    let system = forest
        .find(&oid("1.3.6.1.4.1.9999.2.6"))
        .expect("system branch");
    match system.node {
        mibgen::domain::NodeRef::Branch(b) => {
            let names: Vec<&str> = b.leaves().iter().map(|l| l.name.as_str()).collect();
            assert_eq!(names, vec!["cpuLoad", "fanSpeed"]);
        }
        mibgen::domain::NodeRef::Scalar(_) => panic!("expected a branch"),
    }
}

#[test]
fn given_branch_with_only_leaves_when_reconciling_then_nothing_moves() {
    // Arrange
    let mut forest = Forest::build(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        scalar("acmeName", "1.3.6.1.4.1.9999.1"),
        scalar("acmeSerial", "1.3.6.1.4.1.9999.2"),
    ])
    .expect("build");
    let before = forest.clone();

    // Act
    forest.reconcile().expect("reconcile");

    // Assert
    assert_eq!(forest, before);
}

#[test]
fn given_top_level_scalar_when_reconciling_then_it_stays_a_root() {
    let mut forest = Forest::build(vec![
        scalar("globalCounter", "1.3.6.1.4.1.8888.1"),
        branch("acme", "1.3.6.1.4.1.9999"),
    ])
    .expect("build");

    forest.reconcile().expect("reconcile");

    assert_eq!(forest.roots().len(), 2);
    assert!(forest.roots()[0].is_leaf());
}

#[test]
fn given_deep_mixed_branch_when_reconciling_then_error_names_inner_branch() {
    // Arrange: stats holds a leaf of its own next to child branch ports
    let mut forest = Forest::build(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        branch("stats", "1.3.6.1.4.1.9999.2"),
        scalar("uptime", "1.3.6.1.4.1.9999.2.1"),
        branch("ports", "1.3.6.1.4.1.9999.2.5"),
    ])
    .expect("build");

    // Act
    let err = forest.reconcile().expect_err("stats is mixed");

    // Assert
    assert!(
        matches!(err, DomainError::UnpinnedLeaves { ref branch, .. } if branch == "stats"),
        "unexpected error: {err:?}"
    );
}
