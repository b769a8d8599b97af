use std::collections::BTreeMap;
use std::fmt::Debug;

use metastore_types::{
    Edge, EdgeKind, EntityKind, Node, NodeId, NodeKind, NodeType, PropertyType, TypeId, Value,
};

use crate::error::StoreResult;

/// The synchronous API of a metadata store.
///
/// All calls are blocking round-trips. Implementations must tolerate concurrent calls from many
/// threads.
pub trait MetadataStore: Debug + Send + Sync {
    /// Registers a new node type and returns its identifier.
    fn put_type(
        &self,
        kind: NodeKind,
        name: &str,
        properties: BTreeMap<String, PropertyType>,
    ) -> StoreResult<TypeId>;

    /// Inserts a node of an existing type and returns its identifier.
    ///
    /// The type must be registered for the same `kind`.
    fn put_node(
        &self,
        kind: NodeKind,
        type_id: TypeId,
        name: &str,
        properties: BTreeMap<String, Value>,
    ) -> StoreResult<NodeId>;

    /// Inserts edges of the given kind.
    ///
    /// Each endpoint pair is `(node, context)`, where `node` is an artifact for attributions and
    /// an execution for associations. Inserting an edge that already exists is not an error.
    /// Returns the number of bytes written.
    fn insert_edges(&self, kind: EdgeKind, endpoints: &[(NodeId, NodeId)]) -> StoreResult<u64>;

    /// Returns all nodes of `target_kind` connected to the given anchor via existing edges.
    fn get_connected_nodes(
        &self,
        anchor_kind: NodeKind,
        anchor_id: NodeId,
        target_kind: NodeKind,
    ) -> StoreResult<Vec<Node>>;

    /// Returns the number of stored entities of the given kind.
    fn count(&self, entity: EntityKind) -> StoreResult<usize>;

    /// Lists the identifiers of all nodes of `kind`, in ascending order.
    fn list_node_ids(&self, kind: NodeKind) -> StoreResult<Vec<NodeId>>;

    /// Lists all edges of `kind`.
    fn list_edges(&self, kind: EdgeKind) -> StoreResult<Vec<Edge>>;

    /// Lists all types registered for `kind`, in ascending order of their identifiers.
    fn list_types(&self, kind: NodeKind) -> StoreResult<Vec<NodeType>>;
}
