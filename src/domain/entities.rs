//! Domain entities: MIB object descriptors and the dump document they come from

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::oid::Oid;

/// Whether an object groups others or carries a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Branch,
    Scalar,
}

/// Declared access of a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Access {
    ReadOnly,
    ReadWrite,
    Other(String),
}

impl Access {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "readonly" | "read-only" | "ReadOnly" => Access::ReadOnly,
            "readwrite" | "read-write" | "ReadWrite" => Access::ReadWrite,
            other => Access::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::ReadOnly => write!(f, "readonly"),
            Access::ReadWrite => write!(f, "readwrite"),
            Access::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for Access {
    fn from(s: String) -> Self {
        Access::parse(&s)
    }
}

impl From<Access> for String {
    fn from(access: Access) -> Self {
        access.to_string()
    }
}

/// One named object from a MIB dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub kind: DescriptorKind,
    pub oid: Oid,
    pub access: Access,
    pub description: String,
}

impl ObjectDescriptor {
    pub fn branch(name: &str, oid: Oid) -> Self {
        Self {
            name: name.to_string(),
            kind: DescriptorKind::Branch,
            oid,
            access: Access::Other(String::new()),
            description: String::new(),
        }
    }

    pub fn scalar(name: &str, oid: Oid, access: Access, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: DescriptorKind::Scalar,
            oid,
            access,
            description: description.to_string(),
        }
    }
}

/// `nodetype` values written by the dump tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeType {
    Node,
    Table,
    Row,
    Scalar,
    Column,
    Notification,
    Group,
    Compliance,
    Capabilities,
}

impl NodeType {
    /// Conformance and notification definitions have no accessor.
    fn kind(self) -> Option<DescriptorKind> {
        match self {
            NodeType::Node | NodeType::Table | NodeType::Row => Some(DescriptorKind::Branch),
            NodeType::Scalar | NodeType::Column => Some(DescriptorKind::Scalar),
            NodeType::Notification
            | NodeType::Group
            | NodeType::Compliance
            | NodeType::Capabilities => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    nodetype: NodeType,
    oid: Oid,
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDump {
    #[serde(rename = "moduleName", default)]
    module_name: Option<String>,
    #[serde(default)]
    nodes: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Structured result of dumping one MIB module.
///
/// `descriptors` keeps the document order of the `nodes` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MibDump {
    pub module: Option<String>,
    pub descriptors: Option<Vec<ObjectDescriptor>>,
}

impl MibDump {
    /// Parse a dump document:
    ///
    /// ```json
    /// {"moduleName": "UHP-MIB",
    ///  "nodes": {"sysDescr": {"nodetype": "scalar", "oid": "1.3.6.1.2.1.1.1",
    ///                         "access": "readonly", "description": "..."}}}
    /// ```
    ///
    /// A document without `nodes` parses to `descriptors: None`.
    pub fn parse(content: &str) -> Result<Self, DumpParseError> {
        let raw: RawDump = serde_json::from_str(content).map_err(|e| DumpParseError {
            message: e.to_string(),
        })?;

        let descriptors = match raw.nodes {
            None => None,
            Some(nodes) => {
                let mut descriptors = Vec::with_capacity(nodes.len());
                for (name, value) in nodes {
                    let node: RawNode =
                        serde_json::from_value(value).map_err(|e| DumpParseError {
                            message: format!("node {}: {}", name, e),
                        })?;
                    let Some(kind) = node.nodetype.kind() else {
                        debug!("skipping {} ({:?})", name, node.nodetype);
                        continue;
                    };
                    descriptors.push(ObjectDescriptor {
                        name,
                        kind,
                        oid: node.oid,
                        access: node
                            .access
                            .map(|a| Access::parse(&a))
                            .unwrap_or_else(|| Access::Other(String::new())),
                        description: node.description.unwrap_or_default(),
                    });
                }
                Some(descriptors)
            }
        };

        Ok(Self {
            module: raw.module_name,
            descriptors,
        })
    }
}

/// Error parsing a dump document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DumpParseError {
    pub message: String,
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
