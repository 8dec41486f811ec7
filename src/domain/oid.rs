//! Numeric object identifiers.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A parsed dotted-integer OID, e.g. `1.3.6.1.2.1.1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    pub fn new(arcs: Vec<u32>) -> Self {
        Self { arcs }
    }

    /// Parse dotted notation. Empty input and non-numeric arcs are rejected.
    pub fn from_dotted(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidOid(s.to_string());
        if s.trim().is_empty() {
            return Err(invalid());
        }
        let arcs = s
            .trim()
            .split('.')
            .map(|arc| arc.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(arcs))
    }

    pub fn to_dotted(&self) -> String {
        self.arcs.iter().join(".")
    }

    /// Strict containment: `other` lies below `self` in the OID tree.
    ///
    /// Same as `other` starting with `self + "."`; equal OIDs are not ancestors.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.arcs.len() > self.arcs.len() && other.arcs.starts_with(&self.arcs)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

impl TryFrom<String> for Oid {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_dotted(&value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.to_dotted()
    }
}

impl std::str::FromStr for Oid {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dotted(s)
    }
}
