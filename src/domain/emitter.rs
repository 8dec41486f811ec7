//! Rust source emitter for a reconciled OID forest.
//!
//! Emission runs in two steps. [`Emitter::plan`] walks the forest, allocates
//! every type name from one shared [`NameRegistry`] and turns each branch into a
//! [`GeneratedClass`]; all failures happen here. [`render`] then assembles the
//! source text and cannot fail, so an invalid forest never yields partial output.

use tracing::{debug, instrument};

use crate::domain::entities::Access;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::naming::{class_name, method_name, NameRegistry, CONSTRUCTOR};
use crate::domain::oid::Oid;
use crate::domain::tree::{Branch, Forest, Scalar, TreeItem};

/// Shared invocation context every generated struct carries.
pub const CONTEXT_TYPE: &str = "SnmpContext";
/// Trait the root struct implements.
pub const DRIVER_TRAIT: &str = "SnmpDriver";
/// Get-only accessor.
pub const RO_LEAF_TYPE: &str = "RoLeaf";
/// Get and set accessor.
pub const RW_LEAF_TYPE: &str = "RwLeaf";

const RUNTIME_TYPES: [&str; 4] = [CONTEXT_TYPE, DRIVER_TRAIT, RO_LEAF_TYPE, RW_LEAF_TYPE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Name of the root driver struct.
    pub root_name: String,
    /// Module path the runtime types are imported from.
    pub runtime_path: String,
    /// MIB module name, used in the file header.
    pub module: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            root_name: "MibDriver".to_string(),
            runtime_path: "crate::snmp".to_string(),
            module: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Root,
    /// Branch whose members are sub-groups.
    Group,
    /// Branch whose members are scalar accessors.
    Leaves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    ReadOnly,
    ReadWrite,
}

impl LeafKind {
    fn type_name(self) -> &'static str {
        match self {
            LeafKind::ReadOnly => RO_LEAF_TYPE,
            LeafKind::ReadWrite => RW_LEAF_TYPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberTarget {
    Class(String),
    Leaf { kind: LeafKind, oid: Oid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub method: String,
    pub target: MemberTarget,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedClass {
    pub name: String,
    pub kind: ClassKind,
    pub oid: Option<Oid>,
    pub description: String,
    pub members: Vec<Member>,
}

impl GeneratedClass {
    pub fn member(&self, method: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.method == method)
    }
}

/// Single-use planner holding the name registry for one emission.
pub struct Emitter<'a> {
    options: &'a EmitOptions,
    names: NameRegistry,
    classes: Vec<GeneratedClass>,
}

impl<'a> Emitter<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        let mut names = NameRegistry::new();
        names.reserve(RUNTIME_TYPES);
        names.reserve([options.root_name.as_str()]);
        Self {
            options,
            names,
            classes: Vec::new(),
        }
    }

    /// Plan all classes: branch classes in pre-order, root class last.
    #[instrument(level = "debug", skip_all)]
    pub fn plan(mut self, forest: &Forest) -> DomainResult<Vec<GeneratedClass>> {
        let mut methods = method_registry();
        let mut members = Vec::with_capacity(forest.roots().len());
        for item in forest.roots() {
            members.push(self.member_for(item, &mut methods)?);
        }
        self.classes.push(GeneratedClass {
            name: self.options.root_name.clone(),
            kind: ClassKind::Root,
            oid: None,
            description: String::new(),
            members,
        });
        debug!("planned {} classes", self.classes.len());
        Ok(self.classes)
    }

    fn member_for(&mut self, item: &TreeItem, methods: &mut NameRegistry) -> DomainResult<Member> {
        match item {
            TreeItem::Branch(branch) => {
                let class = self.plan_branch(branch)?;
                Ok(Member {
                    method: methods.allocate(&method_name(&branch.name)),
                    target: MemberTarget::Class(class),
                    description: branch.description.clone(),
                })
            }
            TreeItem::Scalar(scalar) => leaf_member(scalar, methods),
        }
    }

    fn plan_branch(&mut self, branch: &Branch) -> DomainResult<String> {
        // Name is taken before descending so no descendant can reuse it
        let name = self.names.allocate(&class_name(&branch.name));
        let slot = self.classes.len();
        self.classes.push(GeneratedClass {
            name: name.clone(),
            kind: if branch.has_child_branches() {
                ClassKind::Group
            } else {
                ClassKind::Leaves
            },
            oid: Some(branch.oid.clone()),
            description: branch.description.clone(),
            members: Vec::new(),
        });

        let mut methods = method_registry();
        let mut members = Vec::with_capacity(branch.leaves().len() + branch.children().len());
        for leaf in branch.leaves() {
            members.push(leaf_member(leaf, &mut methods)?);
        }
        for child in branch.children() {
            members.push(self.member_for(child, &mut methods)?);
        }
        self.classes[slot].members = members;
        Ok(name)
    }
}

/// Method names are unique per class; `new` belongs to the constructor.
fn method_registry() -> NameRegistry {
    let mut methods = NameRegistry::new();
    methods.reserve([CONSTRUCTOR]);
    methods
}

fn leaf_member(scalar: &Scalar, methods: &mut NameRegistry) -> DomainResult<Member> {
    let kind = match &scalar.access {
        Access::ReadOnly => LeafKind::ReadOnly,
        Access::ReadWrite => LeafKind::ReadWrite,
        Access::Other(access) => {
            return Err(DomainError::UnsupportedAccess {
                name: scalar.name.clone(),
                access: access.clone(),
            })
        }
    };
    Ok(Member {
        method: methods.allocate(&method_name(&scalar.name)),
        target: MemberTarget::Leaf {
            kind,
            oid: scalar.oid.clone(),
        },
        description: scalar.description.clone(),
    })
}

/// Plan and render `forest` in one go.
pub fn emit(forest: &Forest, options: &EmitOptions) -> DomainResult<String> {
    let classes = Emitter::new(options).plan(forest)?;
    Ok(render(&classes, options))
}

/// Assemble the source file from planned classes.
pub fn render(classes: &[GeneratedClass], options: &EmitOptions) -> String {
    let mut output = String::new();

    match &options.module {
        Some(module) => output.push_str(&format!(
            "// @generated by mibgen from {}. Do not edit by hand.\n\n",
            module
        )),
        None => output.push_str("// @generated by mibgen. Do not edit by hand.\n\n"),
    }
    output.push_str("#[allow(unused_imports)]\n");
    output.push_str(&format!(
        "use {}::{{{}, {}, {}, {}}};\n",
        options.runtime_path, RO_LEAF_TYPE, RW_LEAF_TYPE, CONTEXT_TYPE, DRIVER_TRAIT
    ));

    let (roots, branches): (Vec<_>, Vec<_>) =
        classes.iter().partition(|c| c.kind == ClassKind::Root);
    for class in branches.into_iter().chain(roots) {
        output.push('\n');
        render_class(&mut output, class);
    }

    output
}

fn render_class(output: &mut String, class: &GeneratedClass) {
    push_doc(output, "", &class.description);
    if let Some(oid) = &class.oid {
        if !class.description.trim().is_empty() {
            output.push_str("///\n");
        }
        output.push_str(&format!("/// OID `{}`\n", oid));
    }
    output.push_str("#[derive(Clone)]\n");
    output.push_str(&format!("pub struct {} {{\n", class.name));
    output.push_str(&format!("    ctx: {},\n", CONTEXT_TYPE));
    output.push_str("}\n\n");

    output.push_str(&format!("impl {} {{\n", class.name));
    output.push_str(&format!("    pub fn new(ctx: {}) -> Self {{\n", CONTEXT_TYPE));
    output.push_str("        Self { ctx }\n");
    output.push_str("    }\n");
    for member in &class.members {
        output.push('\n');
        render_member(output, member);
    }
    output.push_str("}\n");

    if class.kind == ClassKind::Root {
        output.push_str(&format!("\nimpl {} for {} {{\n", DRIVER_TRAIT, class.name));
        output.push_str(&format!("    fn context(&self) -> &{} {{\n", CONTEXT_TYPE));
        output.push_str("        &self.ctx\n");
        output.push_str("    }\n");
        output.push_str("}\n");
    }
}

fn render_member(output: &mut String, member: &Member) {
    push_doc(output, "    ", &member.description);
    match &member.target {
        MemberTarget::Class(class) => {
            output.push_str(&format!("    pub fn {}(&self) -> {} {{\n", member.method, class));
            output.push_str(&format!("        {}::new(self.ctx.clone())\n", class));
            output.push_str("    }\n");
        }
        MemberTarget::Leaf { kind, oid } => {
            let leaf_type = kind.type_name();
            output.push_str(&format!(
                "    pub fn {}(&self, index: Option<u32>) -> {} {{\n",
                member.method, leaf_type
            ));
            output.push_str(&format!(
                "        let oid = format!(\"{}.{{}}\", index.unwrap_or(0));\n",
                oid
            ));
            match kind {
                LeafKind::ReadOnly => output.push_str(&format!(
                    "        {}::new(oid, self.ctx.getter())\n",
                    leaf_type
                )),
                LeafKind::ReadWrite => output.push_str(&format!(
                    "        {}::new(oid, self.ctx.getter(), self.ctx.setter())\n",
                    leaf_type
                )),
            }
            output.push_str("    }\n");
        }
    }
}

/// Write `text` as `///` lines, trimming the indentation MIB descriptions carry.
fn push_doc(output: &mut String, indent: &str, text: &str) {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return;
    };
    for line in &lines[start..=end] {
        if line.is_empty() {
            output.push_str(&format!("{}///\n", indent));
        } else {
            output.push_str(&format!("{}/// {}\n", indent, line));
        }
    }
}
