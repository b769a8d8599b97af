//! Generation of work items from a snapshot of the store.
//!
//! Work items are planned once, before any operation runs. Each item fully describes one future
//! operation, referencing only nodes that existed when the [`StoreSnapshot`] was captured.

use std::collections::{BTreeSet, HashMap};

use metastore_service::MetadataStore;
use metastore_types::{Edge, EdgeKind, EntityKind, NodeId, NodeKind};
use rand::Rng;

use crate::config::{FillContextEdgesConfig, ReadSpecification};
use crate::error::{Result, WorkloadError};
use crate::popularity::PopularitySampler;

/// Plan for inserting a batch of edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeWorkItem {
    /// The kind of all edges in this batch.
    pub kind: EdgeKind,
    /// `(node, context)` endpoints, one per edge.
    pub endpoints: Vec<(NodeId, NodeId)>,
}

impl EdgeWorkItem {
    /// The number of edges inserted by this item.
    pub fn num_edges(&self) -> usize {
        self.endpoints.len()
    }
}

/// Plan for reading the nodes connected to an anchor node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadWorkItem {
    /// The kind of the anchor node.
    pub anchor_kind: NodeKind,
    /// The anchor node.
    pub anchor_id: NodeId,
    /// The kind of nodes to fetch.
    pub target_kind: NodeKind,
}

/// Read-only view of the entities present in a store at one point in time.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    nodes: HashMap<NodeKind, Vec<NodeId>>,
    edges: HashMap<EdgeKind, Vec<Edge>>,
}

impl StoreSnapshot {
    /// Lists the nodes and edges of the given kinds.
    ///
    /// Kinds that are not requested appear empty in the snapshot.
    pub fn capture(
        store: &dyn MetadataStore,
        node_kinds: &[NodeKind],
        edge_kinds: &[EdgeKind],
    ) -> Result<Self> {
        let mut snapshot = Self::default();
        for &kind in node_kinds {
            snapshot.nodes.insert(kind, store.list_node_ids(kind)?);
        }
        for &kind in edge_kinds {
            snapshot.edges.insert(kind, store.list_edges(kind)?);
        }

        tracing::debug!(
            nodes = ?snapshot.nodes.iter().map(|(k, v)| (*k, v.len())).collect::<Vec<_>>(),
            edges = ?snapshot.edges.iter().map(|(k, v)| (*k, v.len())).collect::<Vec<_>>(),
            "captured store snapshot"
        );

        Ok(snapshot)
    }

    /// The nodes of `kind`.
    pub fn nodes(&self, kind: NodeKind) -> &[NodeId] {
        self.nodes.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// The edges of `kind`.
    pub fn edges(&self, kind: EdgeKind) -> &[Edge] {
        self.edges.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// The nodes of `kind` that are an endpoint of at least one edge of `edge_kind`.
    pub fn connected_nodes(&self, kind: NodeKind, edge_kind: EdgeKind) -> Vec<NodeId> {
        let endpoints: BTreeSet<_> = self
            .edges(edge_kind)
            .iter()
            .map(|edge| {
                if kind.is_context() {
                    edge.context_id
                } else {
                    edge.node_id
                }
            })
            .collect();
        endpoints.into_iter().collect()
    }
}

fn require_population<T>(population: &[T], kind: EntityKind) -> Result<()> {
    if population.is_empty() {
        return Err(WorkloadError::InsufficientPopulation { kind });
    }
    Ok(())
}

/// Plans `num_items` edge insertions.
///
/// Every item draws its edge count uniformly from the configured range, then samples both
/// endpoints of every edge by popularity. An empty range or one that allows zero edges is
/// rejected with [`WorkloadError::InvalidConfig`].
pub fn generate_edge_items(
    config: &FillContextEdgesConfig,
    num_items: usize,
    snapshot: &StoreSnapshot,
    node_sampler: &mut dyn PopularitySampler,
    context_sampler: &mut dyn PopularitySampler,
    rng: &mut impl Rng,
) -> Result<Vec<EdgeWorkItem>> {
    config.num_edges.validate()?;

    let kind = config.specification.edge_kind();
    let nodes = snapshot.nodes(kind.non_context_kind());
    let contexts = snapshot.nodes(NodeKind::Context);

    require_population(nodes, kind.non_context_kind().into())?;
    require_population(contexts, NodeKind::Context.into())?;

    let node_alpha = config.non_context_node_popularity.dirichlet_alpha;
    let context_alpha = config.context_node_popularity.dirichlet_alpha;
    let range = config.num_edges.minimum..=config.num_edges.maximum;

    (0..num_items)
        .map(|_| -> Result<EdgeWorkItem> {
            let num_edges = rng.random_range(range.clone());
            let endpoints = (0..num_edges)
                .map(|_| -> Result<(NodeId, NodeId)> {
                    let node = nodes[node_sampler.sample(nodes.len(), node_alpha)?];
                    let context = contexts[context_sampler.sample(contexts.len(), context_alpha)?];
                    Ok((node, context))
                })
                .collect::<Result<_>>()?;

            Ok(EdgeWorkItem { kind, endpoints })
        })
        .collect()
}

/// Plans `num_items` reads.
///
/// Anchors are sampled only among nodes that participate in at least one edge of the traversed
/// kind, so every read returns a non-empty result against an unchanged store.
pub fn generate_read_items(
    specification: ReadSpecification,
    num_items: usize,
    snapshot: &StoreSnapshot,
    sampler: &mut dyn PopularitySampler,
    concentration: f64,
) -> Result<Vec<ReadWorkItem>> {
    let anchor_kind = specification.anchor_kind();
    let edge_kind = specification.edge_kind();

    require_population(snapshot.nodes(anchor_kind), anchor_kind.into())?;
    let anchors = snapshot.connected_nodes(anchor_kind, edge_kind);
    require_population(&anchors, edge_kind.into())?;

    (0..num_items)
        .map(|_| -> Result<ReadWorkItem> {
            let anchor_id = anchors[sampler.sample(anchors.len(), concentration)?];
            Ok(ReadWorkItem {
                anchor_kind,
                anchor_id,
                target_kind: specification.target_kind(),
            })
        })
        .collect()
}
