//! Context edges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeKind};

/// The kinds of edges between a non-context node and a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Artifact → Context.
    Attribution,
    /// Execution → Context.
    Association,
}

impl EdgeKind {
    /// Both edge kinds.
    pub const ALL: [EdgeKind; 2] = [EdgeKind::Attribution, EdgeKind::Association];

    /// The kind of node on the non-context end of this edge.
    pub fn non_context_kind(self) -> NodeKind {
        match self {
            Self::Attribution => NodeKind::Artifact,
            Self::Association => NodeKind::Execution,
        }
    }

    /// Returns the edge kind connecting nodes of `kind` to contexts, if any.
    pub fn connecting(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Artifact => Some(Self::Attribution),
            NodeKind::Execution => Some(Self::Association),
            NodeKind::Context => None,
        }
    }

    /// Returns the lowercase name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribution => "attribution",
            Self::Association => "association",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge from an artifact or execution to a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    /// Attribution or association.
    pub kind: EdgeKind,
    /// The artifact or execution end.
    pub node_id: NodeId,
    /// The context end.
    pub context_id: NodeId,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(kind: EdgeKind, node_id: NodeId, context_id: NodeId) -> Self {
        Self {
            kind,
            node_id,
            context_id,
        }
    }
}
