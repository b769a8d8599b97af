//! Shared data model of the metadata store.
//!
//! The store holds three kinds of [`Node`]s: artifacts, executions and contexts. Every node
//! belongs to a [`NodeType`] of the same kind. Artifacts and executions are grouped into contexts
//! through typed [`Edge`]s:
//!
//!  - an *attribution* links an artifact to a context,
//!  - an *association* links an execution to a context.
//!
//! The benchmark measures payload volume in terms of the serialized size of these types, see
//! [`encoded_len`].
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod edge;
pub mod node;

pub use edge::{Edge, EdgeKind};
pub use node::{Node, NodeId, NodeKind, NodeType, PropertyType, TypeId, Value};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Any countable entity in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Nodes of the given kind.
    Node(NodeKind),
    /// Edges of the given kind.
    Edge(EdgeKind),
    /// Types registered for nodes of the given kind.
    Type(NodeKind),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(kind) => write!(f, "{kind}"),
            Self::Edge(kind) => write!(f, "{kind}"),
            Self::Type(kind) => write!(f, "{kind} type"),
        }
    }
}

impl From<NodeKind> for EntityKind {
    fn from(kind: NodeKind) -> Self {
        Self::Node(kind)
    }
}

impl From<EdgeKind> for EntityKind {
    fn from(kind: EdgeKind) -> Self {
        Self::Edge(kind)
    }
}

/// Returns the number of bytes `value` occupies on the wire.
///
/// This is the single definition of "bytes transferred" shared by the store and the benchmark.
///
/// # Examples
///
/// ```
/// use metastore_types::{Edge, EdgeKind, NodeId, encoded_len};
///
/// let edge = Edge::new(EdgeKind::Attribution, NodeId(1), NodeId(2));
/// assert!(encoded_len(&edge).unwrap() > 0);
/// ```
pub fn encoded_len<T>(value: &T) -> Result<u64, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut counter = ByteCounter(0);
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.0)
}

/// A writer that discards its input and only counts bytes.
struct ByteCounter(u64);

impl std::io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn encoded_len_matches_serialized_bytes() {
        let node = Node {
            id: NodeId(7),
            kind: NodeKind::Artifact,
            type_id: TypeId(1),
            name: "artifact-7".into(),
            properties: BTreeMap::from([("uri".to_owned(), Value::String("/tmp/a".into()))]),
        };

        let expected = serde_json::to_vec(&node).unwrap().len() as u64;
        assert_eq!(encoded_len(&node).unwrap(), expected);
    }

    #[test]
    fn entity_kinds_from_node_and_edge_kinds() {
        assert_eq!(
            EntityKind::from(NodeKind::Context),
            EntityKind::Node(NodeKind::Context)
        );
        assert_eq!(
            EntityKind::from(EdgeKind::Association),
            EntityKind::Edge(EdgeKind::Association)
        );
        assert!(NodeKind::ALL.iter().filter(|k| k.is_context()).eq([&NodeKind::Context]));
    }

    #[test]
    fn empty_slice_is_not_free() {
        // `[]` is still two bytes on the wire
        let nodes: &[Node] = &[];
        assert_eq!(encoded_len(nodes).unwrap(), 2);
    }
}
