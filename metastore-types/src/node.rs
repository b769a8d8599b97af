//! Nodes and node types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three kinds of nodes held by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Data consumed or produced by an execution.
    Artifact,
    /// A run of a component.
    Execution,
    /// A grouping of artifacts and executions, such as an experiment or a pipeline run.
    Context,
}

impl NodeKind {
    /// All node kinds, in declaration order.
    pub const ALL: [NodeKind; 3] = [NodeKind::Artifact, NodeKind::Execution, NodeKind::Context];

    /// Returns the lowercase name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artifact => "artifact",
            Self::Execution => "execution",
            Self::Context => "context",
        }
    }

    /// Returns `true` for [`NodeKind::Context`].
    pub fn is_context(self) -> bool {
        self == Self::Context
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-assigned identifier of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a [`NodeType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub i64);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The declared type of a property on a [`NodeType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// 64 bit signed integer.
    Int,
    /// Double precision float.
    Double,
    /// UTF-8 string.
    String,
}

/// A property value carried by a [`Node`].
///
/// Properties are opaque to the benchmark, only their size is measured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Double(f64),
    /// A string value.
    String(String),
}

impl Value {
    /// Returns the [`PropertyType`] this value satisfies.
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Int(_) => PropertyType::Int,
            Self::Double(_) => PropertyType::Double,
            Self::String(_) => PropertyType::String,
        }
    }
}

/// A registered node type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    /// Identifier of this type.
    pub id: TypeId,
    /// The kind of nodes this type applies to.
    pub kind: NodeKind,
    /// Unique name within its kind.
    pub name: String,
    /// Declared properties.
    pub properties: BTreeMap<String, PropertyType>,
}

/// An artifact, execution or context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of this node, unique within its kind.
    pub id: NodeId,
    /// The kind of node.
    pub kind: NodeKind,
    /// The [`NodeType`] of this node.
    pub type_id: TypeId,
    /// Human readable name.
    pub name: String,
    /// Properties as declared by the node type.
    pub properties: BTreeMap<String, Value>,
}
