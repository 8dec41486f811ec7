//! Second pass over the built tree: push every scalar down to the deepest
//! branch that contains it.
//!
//! The tree builder parks scalars on whichever branch was their first known
//! ancestor. Once all branches are in place, each branch hands its scalars to
//! the child branch that contains them, and that child is fully reconciled
//! before the next child is looked at.
//!
//! A branch that ends up with both child branches and scalars of its own is
//! rejected: generated classes are either groups of groups or groups of
//! scalars.

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tree::{Branch, Forest, Scalar, TreeItem};

impl Branch {
    #[instrument(level = "debug", skip(self), fields(branch = %self.name))]
    pub fn reconcile(&mut self) -> DomainResult<()> {
        for child in self.children.iter_mut() {
            let TreeItem::Branch(child) = child else {
                continue;
            };

            let (moved, kept): (Vec<Scalar>, Vec<Scalar>) = std::mem::take(&mut self.leaves)
                .into_iter()
                .partition(|leaf| child.oid.is_ancestor_of(&leaf.oid));
            self.leaves = kept;
            if !moved.is_empty() {
                debug!("moving {} scalar(s) to {}", moved.len(), child.name);
                child.leaves.extend(moved);
            }

            child.reconcile()?;
        }

        if self.has_child_branches() && !self.leaves.is_empty() {
            return Err(DomainError::UnpinnedLeaves {
                branch: self.name.clone(),
                leaves: self.leaves.iter().map(|leaf| leaf.to_string()).collect(),
            });
        }
        Ok(())
    }
}

impl Forest {
    /// Reconcile every top-level branch. Top-level scalars stay where they are.
    pub fn reconcile(&mut self) -> DomainResult<()> {
        for root in self.roots_mut() {
            if let TreeItem::Branch(branch) = root {
                branch.reconcile()?;
            }
        }
        Ok(())
    }
}
