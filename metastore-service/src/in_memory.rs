//! In-memory metadata store.
//!
//! This provides a [`MetadataStore`] backed by ordered maps behind a single `RwLock`, which
//! serves both as the store of the benchmark binary and as the fixture of tests. The store is
//! [`Clone`] so tests can hold a handle for direct inspection while workers share another one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use metastore_types::{
    Edge, EdgeKind, EntityKind, Node, NodeId, NodeKind, NodeType, PropertyType, TypeId, Value,
    encoded_len,
};

use crate::error::{StoreError, StoreResult};
use crate::store::MetadataStore;

/// Nodes and types of one [`NodeKind`].
#[derive(Debug, Default)]
struct NodeTable {
    next_node_id: i64,
    next_type_id: i64,
    types: BTreeMap<TypeId, NodeType>,
    nodes: BTreeMap<NodeId, Node>,
}

/// Edges of one [`EdgeKind`], indexed from both ends.
#[derive(Debug, Default)]
struct EdgeTable {
    len: usize,
    by_node: BTreeMap<NodeId, BTreeSet<NodeId>>,
    by_context: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl EdgeTable {
    fn insert(&mut self, node_id: NodeId, context_id: NodeId) {
        if self.by_node.entry(node_id).or_default().insert(context_id) {
            self.by_context.entry(context_id).or_default().insert(node_id);
            self.len += 1;
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    artifacts: NodeTable,
    executions: NodeTable,
    contexts: NodeTable,
    attributions: EdgeTable,
    associations: EdgeTable,
}

impl Inner {
    fn nodes(&self, kind: NodeKind) -> &NodeTable {
        match kind {
            NodeKind::Artifact => &self.artifacts,
            NodeKind::Execution => &self.executions,
            NodeKind::Context => &self.contexts,
        }
    }

    fn nodes_mut(&mut self, kind: NodeKind) -> &mut NodeTable {
        match kind {
            NodeKind::Artifact => &mut self.artifacts,
            NodeKind::Execution => &mut self.executions,
            NodeKind::Context => &mut self.contexts,
        }
    }

    fn edges(&self, kind: EdgeKind) -> &EdgeTable {
        match kind {
            EdgeKind::Attribution => &self.attributions,
            EdgeKind::Association => &self.associations,
        }
    }

    fn edges_mut(&mut self, kind: EdgeKind) -> &mut EdgeTable {
        match kind {
            EdgeKind::Attribution => &mut self.attributions,
            EdgeKind::Association => &mut self.associations,
        }
    }

    fn require_node(&self, kind: NodeKind, id: NodeId) -> StoreResult<()> {
        if self.nodes(kind).nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                entity: EntityKind::Node(kind),
                id: id.0,
            })
        }
    }
}

/// A [`MetadataStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`] until reset.
    ///
    /// Useful for simulating storage outages in tests.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

impl MetadataStore for InMemoryStore {
    fn put_type(
        &self,
        kind: NodeKind,
        name: &str,
        properties: BTreeMap<String, PropertyType>,
    ) -> StoreResult<TypeId> {
        let mut inner = self.write()?;
        let table = inner.nodes_mut(kind);

        if table.types.values().any(|ty| ty.name == name) {
            return Err(StoreError::AlreadyExists {
                entity: EntityKind::Type(kind),
                name: name.to_owned(),
            });
        }

        table.next_type_id += 1;
        let id = TypeId(table.next_type_id);
        table.types.insert(
            id,
            NodeType {
                id,
                kind,
                name: name.to_owned(),
                properties,
            },
        );

        Ok(id)
    }

    fn put_node(
        &self,
        kind: NodeKind,
        type_id: TypeId,
        name: &str,
        properties: BTreeMap<String, Value>,
    ) -> StoreResult<NodeId> {
        let mut inner = self.write()?;
        let table = inner.nodes_mut(kind);

        let Some(node_type) = table.types.get(&type_id) else {
            return Err(StoreError::NotFound {
                entity: EntityKind::Type(kind),
                id: type_id.0,
            });
        };

        for (key, value) in &properties {
            match node_type.properties.get(key) {
                Some(declared) if *declared == value.property_type() => {}
                Some(declared) => {
                    return Err(StoreError::InvalidArgument(format!(
                        "property `{key}` of type `{}` must be {declared:?}",
                        node_type.name
                    )));
                }
                None => {
                    return Err(StoreError::InvalidArgument(format!(
                        "property `{key}` is not declared by type `{}`",
                        node_type.name
                    )));
                }
            }
        }

        table.next_node_id += 1;
        let id = NodeId(table.next_node_id);
        table.nodes.insert(
            id,
            Node {
                id,
                kind,
                type_id,
                name: name.to_owned(),
                properties,
            },
        );

        Ok(id)
    }

    fn insert_edges(&self, kind: EdgeKind, endpoints: &[(NodeId, NodeId)]) -> StoreResult<u64> {
        let edges: Vec<_> = endpoints
            .iter()
            .map(|&(node_id, context_id)| Edge::new(kind, node_id, context_id))
            .collect();
        let bytes = encoded_len(&edges).map_err(|cause| StoreError::Serde {
            context: format!("encoding {kind} edges"),
            cause,
        })?;

        let mut inner = self.write()?;

        // validate everything up front so a failed request leaves no partial writes
        for edge in &edges {
            inner.require_node(kind.non_context_kind(), edge.node_id)?;
            inner.require_node(NodeKind::Context, edge.context_id)?;
        }

        let table = inner.edges_mut(kind);
        for edge in &edges {
            table.insert(edge.node_id, edge.context_id);
        }

        Ok(bytes)
    }

    fn get_connected_nodes(
        &self,
        anchor_kind: NodeKind,
        anchor_id: NodeId,
        target_kind: NodeKind,
    ) -> StoreResult<Vec<Node>> {
        let inner = self.read()?;

        let (edge_kind, via_context) = match (anchor_kind, target_kind) {
            (NodeKind::Context, NodeKind::Artifact | NodeKind::Execution) => {
                (EdgeKind::connecting(target_kind), true)
            }
            (NodeKind::Artifact | NodeKind::Execution, NodeKind::Context) => {
                (EdgeKind::connecting(anchor_kind), false)
            }
            _ => (None, false),
        };
        let Some(edge_kind) = edge_kind else {
            return Err(StoreError::InvalidArgument(format!(
                "no edges connect {anchor_kind} to {target_kind}"
            )));
        };

        inner.require_node(anchor_kind, anchor_id)?;

        let edges = inner.edges(edge_kind);
        let index = if via_context {
            &edges.by_context
        } else {
            &edges.by_node
        };

        let targets = &inner.nodes(target_kind).nodes;
        let nodes = index
            .get(&anchor_id)
            .into_iter()
            .flatten()
            .filter_map(|id| targets.get(id).cloned())
            .collect();

        Ok(nodes)
    }

    fn count(&self, entity: EntityKind) -> StoreResult<usize> {
        let inner = self.read()?;
        let count = match entity {
            EntityKind::Node(kind) => inner.nodes(kind).nodes.len(),
            EntityKind::Type(kind) => inner.nodes(kind).types.len(),
            EntityKind::Edge(kind) => inner.edges(kind).len,
        };
        Ok(count)
    }

    fn list_node_ids(&self, kind: NodeKind) -> StoreResult<Vec<NodeId>> {
        let inner = self.read()?;
        Ok(inner.nodes(kind).nodes.keys().copied().collect())
    }

    fn list_edges(&self, kind: EdgeKind) -> StoreResult<Vec<Edge>> {
        let inner = self.read()?;
        let edges = inner
            .edges(kind)
            .by_node
            .iter()
            .flat_map(|(&node_id, contexts)| {
                contexts
                    .iter()
                    .map(move |&context_id| Edge::new(kind, node_id, context_id))
            })
            .collect();
        Ok(edges)
    }

    fn list_types(&self, kind: NodeKind) -> StoreResult<Vec<NodeType>> {
        let inner = self.read()?;
        Ok(inner.nodes(kind).types.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_nodes() -> (InMemoryStore, NodeId, NodeId, NodeId) {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for kind in NodeKind::ALL {
            let type_id = store
                .put_type(kind, &format!("{kind}_type"), BTreeMap::new())
                .unwrap();
            ids.push(
                store
                    .put_node(kind, type_id, &format!("{kind}_0"), BTreeMap::new())
                    .unwrap(),
            );
        }
        (store, ids[0], ids[1], ids[2])
    }

    #[test]
    fn ids_are_assigned_per_kind() {
        let (_store, artifact, execution, context) = store_with_nodes();
        assert_eq!(artifact, NodeId(1));
        assert_eq!(execution, NodeId(1));
        assert_eq!(context, NodeId(1));
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let store = InMemoryStore::new();
        store
            .put_type(NodeKind::Artifact, "dataset", BTreeMap::new())
            .unwrap();

        let result = store.put_type(NodeKind::Artifact, "dataset", BTreeMap::new());
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

        // same name is fine for a different kind
        store
            .put_type(NodeKind::Context, "dataset", BTreeMap::new())
            .unwrap();
    }

    #[test]
    fn undeclared_properties_are_rejected() {
        let store = InMemoryStore::new();
        let type_id = store
            .put_type(
                NodeKind::Artifact,
                "dataset",
                BTreeMap::from([("size".to_owned(), PropertyType::Int)]),
            )
            .unwrap();

        let wrong_type = BTreeMap::from([("size".to_owned(), Value::String("big".into()))]);
        let result = store.put_node(NodeKind::Artifact, type_id, "a", wrong_type);
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));

        let undeclared = BTreeMap::from([("uri".to_owned(), Value::String("/a".into()))]);
        let result = store.put_node(NodeKind::Artifact, type_id, "a", undeclared);
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn edges_connect_both_directions() {
        let (store, artifact, _execution, context) = store_with_nodes();

        let bytes = store
            .insert_edges(EdgeKind::Attribution, &[(artifact, context)])
            .unwrap();
        assert!(bytes > 0);

        let artifacts = store
            .get_connected_nodes(NodeKind::Context, context, NodeKind::Artifact)
            .unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].id, artifact);

        let contexts = store
            .get_connected_nodes(NodeKind::Artifact, artifact, NodeKind::Context)
            .unwrap();
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].kind, NodeKind::Context);

        // nothing was associated
        let executions = store
            .get_connected_nodes(NodeKind::Context, context, NodeKind::Execution)
            .unwrap();
        assert!(executions.is_empty());
    }

    #[test]
    fn duplicate_edges_are_stored_once() {
        let (store, artifact, _execution, context) = store_with_nodes();

        store
            .insert_edges(
                EdgeKind::Attribution,
                &[(artifact, context), (artifact, context)],
            )
            .unwrap();
        store
            .insert_edges(EdgeKind::Attribution, &[(artifact, context)])
            .unwrap();

        assert_eq!(
            store.count(EntityKind::Edge(EdgeKind::Attribution)).unwrap(),
            1
        );
        assert_eq!(store.list_edges(EdgeKind::Attribution).unwrap().len(), 1);
    }

    #[test]
    fn edges_to_missing_nodes_leave_no_partial_writes() {
        let (store, artifact, _execution, context) = store_with_nodes();

        let result = store.insert_edges(
            EdgeKind::Attribution,
            &[(artifact, context), (artifact, NodeId(42))],
        );
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: EntityKind::Node(NodeKind::Context),
                id: 42
            })
        ));
        assert_eq!(
            store.count(EntityKind::Edge(EdgeKind::Attribution)).unwrap(),
            0
        );
    }

    #[test]
    fn unsupported_directions_are_rejected() {
        let (store, artifact, _execution, _context) = store_with_nodes();
        let result = store.get_connected_nodes(NodeKind::Artifact, artifact, NodeKind::Execution);
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn unavailable_store_fails_all_calls() {
        let (store, artifact, _execution, context) = store_with_nodes();
        store.set_unavailable(true);

        assert!(matches!(
            store.count(EntityKind::Node(NodeKind::Artifact)),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.insert_edges(EdgeKind::Attribution, &[(artifact, context)]),
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert_eq!(store.count(EntityKind::Node(NodeKind::Artifact)).unwrap(), 1);
    }
}
