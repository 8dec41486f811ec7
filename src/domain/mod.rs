//! Domain layer: OID tree, reconciliation and code emission
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod emitter;
pub mod entities;
pub mod error;
pub mod naming;
pub mod oid;
mod reconcile;
pub mod tree;

pub use emitter::{
    emit, render, ClassKind, EmitOptions, Emitter, GeneratedClass, LeafKind, Member, MemberTarget,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use oid::Oid;
pub use tree::{Branch, Forest, NodeRef, Scalar, TreeItem, Visit};
