//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the OID tree rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid oid: {0:?}")]
    InvalidOid(String),

    #[error("duplicate oid {oid}: {first} and {second}")]
    DuplicateOid {
        oid: String,
        first: String,
        second: String,
    },

    #[error("scalar {leaf} ({oid}) cannot contain {descendant}")]
    LeafHasDescendant {
        leaf: String,
        oid: String,
        descendant: String,
    },

    #[error("branch {branch} mixes sub-groups with unpinned scalars: {}", leaves.join(", "))]
    UnpinnedLeaves { branch: String, leaves: Vec<String> },

    #[error("unsupported access mode {access:?} on {name}")]
    UnsupportedAccess { name: String, access: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
