//! OID tree: branches, scalars and the prefix-containment merge that nests them.

use std::collections::HashMap;
use std::fmt;

use tracing::{instrument, trace};

use crate::domain::entities::{Access, DescriptorKind, ObjectDescriptor};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::oid::Oid;

/// Terminal MIB object with a readable and possibly writable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub name: String,
    pub oid: Oid,
    pub access: Access,
    pub description: String,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.oid)
    }
}

/// Grouping node. Child branches live in `children`, directly attached
/// scalars in `leaves`; both keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub oid: Oid,
    pub description: String,
    pub(crate) children: Vec<TreeItem>,
    pub(crate) leaves: Vec<Scalar>,
}

impl Branch {
    pub fn new(name: &str, oid: Oid) -> Self {
        Self {
            name: name.to_string(),
            oid,
            description: String::new(),
            children: Vec::new(),
            leaves: Vec::new(),
        }
    }

    pub fn children(&self) -> &[TreeItem] {
        &self.children
    }

    pub fn leaves(&self) -> &[Scalar] {
        &self.leaves
    }

    pub fn child_branches(&self) -> impl Iterator<Item = &Branch> {
        self.children.iter().filter_map(TreeItem::as_branch)
    }

    pub fn has_child_branches(&self) -> bool {
        self.child_branches().next().is_some()
    }

    /// Attach a contained item: scalars go straight to the leaf registry,
    /// branches are merged into the child registry one level down.
    ///
    /// Fails with `LeafHasDescendant` when a scalar anywhere below this branch
    /// contains `item`, or when `item` is a scalar containing something below it.
    pub fn attach(&mut self, item: TreeItem) -> DomainResult<()> {
        self.check_leaf_containment(&item)?;
        match item {
            TreeItem::Scalar(scalar) => {
                trace!("leaf {} -> {}", scalar.name, self.name);
                self.leaves.push(scalar);
                Ok(())
            }
            branch @ TreeItem::Branch(_) => merge_into(&mut self.children, branch),
        }
    }

    fn check_leaf_containment(&self, item: &TreeItem) -> DomainResult<()> {
        let mut stack: Vec<NodeRef<'_>> = self.leaves.iter().map(NodeRef::Scalar).collect();
        stack.extend(self.children.iter().map(NodeRef::from));
        while let Some(node) = stack.pop() {
            match node {
                NodeRef::Scalar(leaf) if leaf.oid.is_ancestor_of(item.oid()) => {
                    return Err(leaf_has_descendant(leaf, item.name()));
                }
                NodeRef::Scalar(_) => {}
                NodeRef::Branch(branch) => {
                    stack.extend(branch.leaves.iter().map(NodeRef::Scalar));
                    stack.extend(branch.children.iter().map(NodeRef::from));
                }
            }
            if let TreeItem::Scalar(scalar) = item {
                if scalar.oid.is_ancestor_of(node.oid()) {
                    return Err(leaf_has_descendant(scalar, node.name()));
                }
            }
        }
        Ok(())
    }
}

/// Either kind of node in the OID tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem {
    Branch(Branch),
    Scalar(Scalar),
}

impl TreeItem {
    pub fn oid(&self) -> &Oid {
        match self {
            TreeItem::Branch(b) => &b.oid,
            TreeItem::Scalar(s) => &s.oid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeItem::Branch(b) => &b.name,
            TreeItem::Scalar(s) => &s.name,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeItem::Scalar(_))
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            TreeItem::Branch(b) => Some(b),
            TreeItem::Scalar(_) => None,
        }
    }
}

impl From<ObjectDescriptor> for TreeItem {
    fn from(d: ObjectDescriptor) -> Self {
        match d.kind {
            DescriptorKind::Branch => TreeItem::Branch(Branch {
                name: d.name,
                oid: d.oid,
                description: d.description,
                children: Vec::new(),
                leaves: Vec::new(),
            }),
            DescriptorKind::Scalar => TreeItem::Scalar(Scalar {
                name: d.name,
                oid: d.oid,
                access: d.access,
                description: d.description,
            }),
        }
    }
}

/// Merge `item` into an ordered registry of siblings.
///
/// Every entry is inspected before anything is changed. An existing ancestor
/// receives `item` recursively; existing descendants are adopted by `item`,
/// which takes over the first adopted slot.
#[instrument(level = "trace", skip(registry, item), fields(item = %item.name()))]
pub(crate) fn merge_into(registry: &mut Vec<TreeItem>, mut item: TreeItem) -> DomainResult<()> {
    let mut ancestor: Option<Oid> = None;
    let mut adopted: Vec<usize> = Vec::new();

    for (idx, existing) in registry.iter().enumerate() {
        if existing.oid() == item.oid() {
            return Err(DomainError::DuplicateOid {
                oid: item.oid().to_string(),
                first: existing.name().to_string(),
                second: item.name().to_string(),
            });
        }
        if existing.oid().is_ancestor_of(item.oid()) {
            if let TreeItem::Scalar(leaf) = existing {
                return Err(leaf_has_descendant(leaf, item.name()));
            }
            ancestor.get_or_insert_with(|| existing.oid().clone());
        } else if item.oid().is_ancestor_of(existing.oid()) {
            adopted.push(idx);
        }
    }

    let mut slot = None;
    if !adopted.is_empty() {
        let branch = match &mut item {
            TreeItem::Branch(branch) => branch,
            TreeItem::Scalar(leaf) => {
                return Err(leaf_has_descendant(leaf, registry[adopted[0]].name()));
            }
        };
        let previous = std::mem::take(registry);
        for (idx, entry) in previous.into_iter().enumerate() {
            if adopted.contains(&idx) {
                slot.get_or_insert(registry.len());
                trace!("{} adopts {}", branch.name, entry.name());
                branch.attach(entry)?;
            } else {
                registry.push(entry);
            }
        }
    }

    if let Some(ancestor) = ancestor {
        if let Some(TreeItem::Branch(parent)) = registry.iter_mut().find(|e| e.oid() == &ancestor)
        {
            return parent.attach(item);
        }
    }

    match slot {
        Some(idx) => registry.insert(idx, item),
        None => registry.push(item),
    }
    Ok(())
}

fn leaf_has_descendant(leaf: &Scalar, descendant: &str) -> DomainError {
    DomainError::LeafHasDescendant {
        leaf: leaf.name.clone(),
        oid: leaf.oid.to_string(),
        descendant: descendant.to_string(),
    }
}

/// Top-level items: everything without an ancestor in the working set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<TreeItem>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from descriptors in the given order.
    ///
    /// OIDs must be unique across the whole input. The result is not yet
    /// reconciled, see [`Forest::reconcile`].
    #[instrument(level = "debug", skip(descriptors))]
    pub fn build<I>(descriptors: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = ObjectDescriptor>,
    {
        let mut seen: HashMap<Oid, String> = HashMap::new();
        let mut forest = Self::new();
        for descriptor in descriptors {
            if let Some(first) = seen.get(&descriptor.oid) {
                return Err(DomainError::DuplicateOid {
                    oid: descriptor.oid.to_string(),
                    first: first.clone(),
                    second: descriptor.name,
                });
            }
            seen.insert(descriptor.oid.clone(), descriptor.name.clone());
            forest.insert(descriptor.into())?;
        }
        Ok(forest)
    }

    pub fn insert(&mut self, item: TreeItem) -> DomainResult<()> {
        merge_into(&mut self.roots, item)
    }

    pub fn roots(&self) -> &[TreeItem] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [TreeItem] {
        &mut self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }

    pub fn branch_count(&self) -> usize {
        self.iter()
            .filter(|v| matches!(v.node, NodeRef::Branch(_)))
            .count()
    }

    pub fn scalar_count(&self) -> usize {
        self.iter()
            .filter(|v| matches!(v.node, NodeRef::Scalar(_)))
            .count()
    }

    /// Locate a node by OID anywhere in the forest.
    pub fn find(&self, oid: &Oid) -> Option<Visit<'_>> {
        self.iter().find(|v| v.node.oid() == oid)
    }
}

/// Borrowed view of a node in either registry.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Branch(&'a Branch),
    Scalar(&'a Scalar),
}

impl<'a> NodeRef<'a> {
    pub fn oid(&self) -> &'a Oid {
        match self {
            NodeRef::Branch(b) => &b.oid,
            NodeRef::Scalar(s) => &s.oid,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            NodeRef::Branch(b) => &b.name,
            NodeRef::Scalar(s) => &s.name,
        }
    }
}

impl<'a> From<&'a TreeItem> for NodeRef<'a> {
    fn from(item: &'a TreeItem) -> Self {
        match item {
            TreeItem::Branch(b) => NodeRef::Branch(b),
            TreeItem::Scalar(s) => NodeRef::Scalar(s),
        }
    }
}

/// A node together with the branch that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub parent: Option<&'a Branch>,
    pub depth: usize,
    pub node: NodeRef<'a>,
}

/// Pre-order traversal: a branch, its leaves, then its child branches.
pub struct TreeIter<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> TreeIter<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest
            .roots
            .iter()
            .rev()
            .map(|item| Visit {
                parent: None,
                depth: 0,
                node: item.into(),
            })
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let NodeRef::Branch(branch) = current.node {
            // Push in reverse so leaves come out first, then children left to right
            for child in branch.children.iter().rev() {
                self.stack.push(Visit {
                    parent: Some(branch),
                    depth: current.depth + 1,
                    node: child.into(),
                });
            }
            for leaf in branch.leaves.iter().rev() {
                self.stack.push(Visit {
                    parent: Some(branch),
                    depth: current.depth + 1,
                    node: NodeRef::Scalar(leaf),
                });
            }
        }
        Some(current)
    }
}
