//! Tests for source emission
//!
//! The emitter turns a reconciled forest into one Rust source file: a struct
//! per branch, accessor methods per scalar, and a root driver struct last.

use rstest::rstest;

use mibgen::domain::{
    emit, Access, ClassKind, DomainError, EmitOptions, Emitter, Forest, LeafKind, MemberTarget,
    ObjectDescriptor, Oid,
};

fn oid(s: &str) -> Oid {
    Oid::from_dotted(s).expect("valid oid")
}

fn branch(name: &str, dotted: &str) -> ObjectDescriptor {
    ObjectDescriptor::branch(name, oid(dotted))
}

fn scalar(name: &str, dotted: &str, access: Access, description: &str) -> ObjectDescriptor {
    ObjectDescriptor::scalar(name, oid(dotted), access, description)
}

fn reconciled(descriptors: Vec<ObjectDescriptor>) -> Forest {
    let mut forest = Forest::build(descriptors).expect("build");
    forest.reconcile().expect("reconcile");
    forest
}

fn scenario_a() -> Forest {
    reconciled(vec![
        branch("sys", "1.3.6.1.2.1.1"),
        scalar("sysDescr", "1.3.6.1.2.1.1.1", Access::ReadOnly, "d1"),
        scalar("sysContact", "1.3.6.1.2.1.1.4", Access::ReadWrite, "d2"),
    ])
}

const SCENARIO_A_SOURCE: &str = r#"// @generated by mibgen. Do not edit by hand.

#[allow(unused_imports)]
use crate::snmp::{RoLeaf, RwLeaf, SnmpContext, SnmpDriver};

/// OID `1.3.6.1.2.1.1`
#[derive(Clone)]
pub struct Sys {
    ctx: SnmpContext,
}

impl Sys {
    pub fn new(ctx: SnmpContext) -> Self {
        Self { ctx }
    }

    /// d1
    pub fn sys_descr(&self, index: Option<u32>) -> RoLeaf {
        let oid = format!("1.3.6.1.2.1.1.1.{}", index.unwrap_or(0));
        RoLeaf::new(oid, self.ctx.getter())
    }

    /// d2
    pub fn sys_contact(&self, index: Option<u32>) -> RwLeaf {
        let oid = format!("1.3.6.1.2.1.1.4.{}", index.unwrap_or(0));
        RwLeaf::new(oid, self.ctx.getter(), self.ctx.setter())
    }
}

#[derive(Clone)]
pub struct MibDriver {
    ctx: SnmpContext,
}

impl MibDriver {
    pub fn new(ctx: SnmpContext) -> Self {
        Self { ctx }
    }

    pub fn sys(&self) -> Sys {
        Sys::new(self.ctx.clone())
    }
}

impl SnmpDriver for MibDriver {
    fn context(&self) -> &SnmpContext {
        &self.ctx
    }
}
"#;

// ============================================================
// Class planning
// ============================================================

#[test]
fn given_system_group_when_planning_then_branch_class_and_root_accessor() {
    // Arrange
    let forest = scenario_a();
    let options = EmitOptions::default();

    // Act
    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    // Assert
    assert_eq!(classes.len(), 2);
    let sys = &classes[0];
    assert_eq!(sys.name, "Sys");
    assert_eq!(sys.kind, ClassKind::Leaves);

    let descr = sys.member("sys_descr").expect("sys_descr");
    assert_eq!(descr.description, "d1");
    assert_eq!(
        descr.target,
        MemberTarget::Leaf {
            kind: LeafKind::ReadOnly,
            oid: oid("1.3.6.1.2.1.1.1"),
        }
    );
    let contact = sys.member("sys_contact").expect("sys_contact");
    assert!(matches!(
        contact.target,
        MemberTarget::Leaf {
            kind: LeafKind::ReadWrite,
            ..
        }
    ));

    let root = &classes[1];
    assert_eq!(root.kind, ClassKind::Root);
    assert_eq!(root.name, "MibDriver");
    assert_eq!(
        root.member("sys").map(|m| &m.target),
        Some(&MemberTarget::Class("Sys".to_string()))
    );
}

#[test]
fn given_two_branches_with_same_name_when_planning_then_second_gets_suffix() {
    // Arrange: stats under two different parents
    let forest = reconciled(vec![
        branch("radio", "1.3.6.1.4.1.9999.1"),
        branch("stats", "1.3.6.1.4.1.9999.1.1"),
        scalar("rxFrames", "1.3.6.1.4.1.9999.1.1.1", Access::ReadOnly, ""),
        branch("modem", "1.3.6.1.4.1.9999.2"),
        branch("stats", "1.3.6.1.4.1.9999.2.1"),
        scalar("crcErrors", "1.3.6.1.4.1.9999.2.1.1", Access::ReadOnly, ""),
    ]);
    let options = EmitOptions::default();

    // Act
    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    // Assert
    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Radio", "Stats", "Modem", "Stats1", "MibDriver"]);
    let modem = classes.iter().find(|c| c.name == "Modem").expect("modem");
    assert_eq!(modem.kind, ClassKind::Group);
    assert_eq!(
        modem.member("stats").map(|m| &m.target),
        Some(&MemberTarget::Class("Stats1".to_string()))
    );
}

#[test]
fn given_branch_named_like_runtime_type_when_planning_then_name_is_suffixed() {
    let forest = reconciled(vec![
        branch("snmpContext", "1.3.6.1.4.1.9999.1"),
        scalar("ctxName", "1.3.6.1.4.1.9999.1.1", Access::ReadOnly, ""),
    ]);
    let options = EmitOptions::default();

    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    assert_eq!(classes[0].name, "SnmpContext1");
}

#[rstest]
#[case::self_branch("self", "Self_", "self_")]
#[case::new_branch("new", "New", "new_")]
#[case::crate_branch("crate", "Crate", "crate_")]
fn given_branch_named_like_keyword_when_planning_then_struct_and_accessor_are_escaped(
    #[case] name: &str,
    #[case] class: &str,
    #[case] method: &str,
) {
    // Arrange
    let forest = reconciled(vec![
        branch(name, "1.3.6.1.4.1.9999.1"),
        scalar("ctxName", "1.3.6.1.4.1.9999.1.1", Access::ReadOnly, ""),
    ]);
    let options = EmitOptions::default();

    // Act
    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    // Assert
    assert_eq!(classes[0].name, class);
    let root = classes.last().expect("root");
    assert_eq!(
        root.member(method).map(|m| &m.target),
        Some(&MemberTarget::Class(class.to_string()))
    );
}

#[test]
fn given_scalar_named_new_when_emitting_then_constructor_is_not_shadowed() {
    // Arrange: branch `self` holding scalar `new`, plus a branch `new`
    let forest = reconciled(vec![
        branch("self", "1.1"),
        scalar("new", "1.1.1", Access::ReadOnly, ""),
        branch("new", "1.2"),
        scalar("newFrames", "1.2.1", Access::ReadOnly, ""),
    ]);

    // Act
    let source = emit(&forest, &EmitOptions::default()).expect("emit");

    // Assert
    assert!(!source.contains("pub struct Self {"));
    assert!(source.contains("pub struct Self_ {\n"));
    assert!(source.contains("pub fn new_(&self, index: Option<u32>) -> RoLeaf {\n"));
    assert!(source.contains("pub fn self_(&self) -> Self_ {\n"));
    assert!(source.contains("pub fn new_(&self) -> New {\n"));
    assert_eq!(source.matches("pub fn new(ctx: SnmpContext)").count(), 3);
    assert_eq!(source.matches("pub fn new(").count(), 3);
}

#[test]
fn given_scalars_with_same_method_name_when_planning_then_second_gets_suffix() {
    let forest = reconciled(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        scalar("rxFrames", "1.3.6.1.4.1.9999.1", Access::ReadOnly, ""),
        scalar("rx-frames", "1.3.6.1.4.1.9999.2", Access::ReadOnly, ""),
    ]);
    let options = EmitOptions::default();

    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    let methods: Vec<&str> = classes[0].members.iter().map(|m| m.method.as_str()).collect();
    assert_eq!(methods, vec!["rx_frames", "rx_frames1"]);
}

#[test]
fn given_top_level_scalar_when_planning_then_root_exposes_leaf_accessor() {
    let forest = reconciled(vec![scalar(
        "globalCounter",
        "1.3.6.1.4.1.8888.1",
        Access::ReadOnly,
        "",
    )]);
    let options = EmitOptions::default();

    let classes = Emitter::new(&options).plan(&forest).expect("plan");

    assert_eq!(classes.len(), 1);
    assert!(classes[0].member("global_counter").is_some());
}

#[rstest]
#[case::notify("notify")]
#[case::not_accessible("not-accessible")]
#[case::missing("")]
fn given_scalar_with_unsupported_access_when_emitting_then_error_and_no_output(
    #[case] access: &str,
) {
    // Arrange
    let forest = reconciled(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        scalar("acmeTrap", "1.3.6.1.4.1.9999.1", Access::parse(access), ""),
    ]);

    // Act
    let result = emit(&forest, &EmitOptions::default());

    // Assert
    assert_eq!(
        result.expect_err("unsupported access"),
        DomainError::UnsupportedAccess {
            name: "acmeTrap".to_string(),
            access: access.to_string(),
        }
    );
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn given_system_group_when_emitting_then_source_matches_expected() {
    let source = emit(&scenario_a(), &EmitOptions::default()).expect("emit");

    assert_eq!(source, SCENARIO_A_SOURCE);
}

#[test]
fn given_same_forest_when_emitting_twice_then_output_is_byte_identical() {
    let first = emit(&scenario_a(), &EmitOptions::default()).expect("emit");
    let second = emit(&scenario_a(), &EmitOptions::default()).expect("emit");

    assert_eq!(first, second);
}

#[test]
fn given_custom_options_when_emitting_then_header_import_and_root_follow_them() {
    // Arrange
    let options = EmitOptions {
        root_name: "AcmeDriver".to_string(),
        runtime_path: "acme_snmp::runtime".to_string(),
        module: Some("ACME-MIB".to_string()),
    };

    // Act
    let source = emit(&scenario_a(), &options).expect("emit");

    // Assert
    assert!(source.starts_with("// @generated by mibgen from ACME-MIB. Do not edit by hand.\n"));
    assert!(
        source.contains("use acme_snmp::runtime::{RoLeaf, RwLeaf, SnmpContext, SnmpDriver};\n")
    );
    assert!(source.contains("pub struct AcmeDriver {\n"));
    assert!(source.contains("impl SnmpDriver for AcmeDriver {\n"));
    assert!(!source.contains("MibDriver"));
}

#[test]
fn given_multiline_description_when_emitting_then_doc_lines_are_trimmed() {
    let forest = reconciled(vec![
        branch("acme", "1.3.6.1.4.1.9999"),
        scalar(
            "acmeName",
            "1.3.6.1.4.1.9999.1",
            Access::ReadWrite,
            "The administratively assigned name.\n            Persisted across reboots.",
        ),
    ]);

    let source = emit(&forest, &EmitOptions::default()).expect("emit");

    assert!(source.contains(
        "    /// The administratively assigned name.\n    /// Persisted across reboots.\n    pub fn acme_name("
    ));
}

#[test]
fn given_root_struct_when_emitting_then_it_comes_after_branch_structs() {
    let source = emit(&scenario_a(), &EmitOptions::default()).expect("emit");

    let sys = source.find("pub struct Sys ").expect("Sys");
    let root = source.find("pub struct MibDriver ").expect("root");
    assert!(sys < root);
}
