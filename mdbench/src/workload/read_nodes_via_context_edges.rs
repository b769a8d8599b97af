use std::time::Instant;

use metastore_service::MetadataStore;
use metastore_types::encoded_len;

use super::{WorkItems, Workload};
use crate::config::ReadNodesViaContextEdgesConfig;
use crate::error::Result;
use crate::generator::{ReadWorkItem, StoreSnapshot, generate_read_items};
use crate::popularity::{DirichletSampler, PopularitySampler, UniformSampler};
use crate::stats::OpStats;

/// Reads the nodes connected to an anchor node across existing context edges.
///
/// Anchors are chosen among nodes that had at least one edge of the traversed kind when the
/// workload was prepared.
#[derive(Debug)]
pub struct ReadNodesViaContextEdges {
    name: String,
    config: ReadNodesViaContextEdgesConfig,
    num_operations: usize,
    seed: u64,
    items: WorkItems<ReadWorkItem>,
}

impl ReadNodesViaContextEdges {
    /// Creates an unprepared workload.
    pub fn new(config: ReadNodesViaContextEdgesConfig, num_operations: usize, seed: u64) -> Self {
        Self {
            name: format!("READ_{}", config.specification.name()),
            config,
            num_operations,
            seed,
            items: WorkItems::Uninitialized,
        }
    }

    /// The planned work items, empty unless prepared.
    pub fn work_items(&self) -> &[ReadWorkItem] {
        self.items.as_slice()
    }
}

impl Workload for ReadNodesViaContextEdges {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_operations(&self) -> usize {
        self.num_operations
    }

    fn prepare(&mut self, store: &dyn MetadataStore) -> Result<()> {
        self.items.ensure_uninitialized()?;

        let spec = self.config.specification;
        let snapshot = StoreSnapshot::capture(store, &[spec.anchor_kind()], &[spec.edge_kind()])?;

        let (mut sampler, concentration): (Box<dyn PopularitySampler>, f64) =
            match self.config.node_popularity {
                Some(popularity) => (
                    Box::new(DirichletSampler::new(self.seed)),
                    popularity.dirichlet_alpha,
                ),
                None => (Box::new(UniformSampler::new(self.seed)), 1.0),
            };

        let items = generate_read_items(
            spec,
            self.num_operations,
            &snapshot,
            sampler.as_mut(),
            concentration,
        )?;

        tracing::debug!(workload = %self.name, items = items.len(), "prepared work items");
        self.items = WorkItems::Prepared(items);
        Ok(())
    }

    fn execute(&self, index: usize, store: &dyn MetadataStore) -> Result<OpStats> {
        let item = self.items.get(index)?;

        let start = Instant::now();
        let nodes = store.get_connected_nodes(item.anchor_kind, item.anchor_id, item.target_kind)?;
        let elapsed = start.elapsed();

        let bytes = nodes
            .iter()
            .map(encoded_len)
            .sum::<Result<u64, serde_json::Error>>()?;

        Ok(OpStats::success(elapsed, bytes))
    }

    fn tear_down(&mut self) {
        self.items = WorkItems::Done;
    }
}

#[cfg(test)]
mod tests {
    use metastore_types::{EdgeKind, EntityKind, NodeKind};

    use super::*;
    use crate::config::{PopularityConfig, ReadSpecification};
    use crate::error::WorkloadError;

    #[test]
    fn names_follow_specification() {
        let config = ReadNodesViaContextEdgesConfig::new(ReadSpecification::ExecutionsByContext);
        let workload = ReadNodesViaContextEdges::new(config, 1, 0);
        assert_eq!(workload.name(), "READ_EXECUTIONS_BY_CONTEXT");
    }

    #[test]
    fn store_without_edges_is_insufficient() {
        let store = metastore_test::seeded_store(1, 10);
        let config = ReadNodesViaContextEdgesConfig::new(ReadSpecification::ArtifactsByContext);
        let mut workload = ReadNodesViaContextEdges::new(config, 10, 0);

        assert!(matches!(
            workload.prepare(&store),
            Err(WorkloadError::InsufficientPopulation {
                kind: EntityKind::Edge(EdgeKind::Attribution)
            })
        ));
        assert!(workload.work_items().is_empty());
    }

    #[test]
    fn reads_return_connected_nodes() {
        let store = metastore_test::seeded_store(1, 10);
        let executions = store.list_node_ids(NodeKind::Execution).unwrap();
        let contexts = store.list_node_ids(NodeKind::Context).unwrap();
        store
            .insert_edges(
                EdgeKind::Association,
                &[(executions[0], contexts[3]), (executions[1], contexts[3])],
            )
            .unwrap();

        let config = ReadNodesViaContextEdgesConfig {
            specification: ReadSpecification::ExecutionsByContext,
            node_popularity: Some(PopularityConfig::new(0.1)),
        };
        let mut workload = ReadNodesViaContextEdges::new(config, 5, 3);
        workload.prepare(&store).unwrap();

        let single = metastore_types::encoded_len(
            &store
                .get_connected_nodes(NodeKind::Context, contexts[3], NodeKind::Execution)
                .unwrap()[0],
        )
        .unwrap();

        for index in 0..5 {
            assert_eq!(workload.work_items()[index].anchor_id, contexts[3]);
            let stats = workload.execute(index, &store).unwrap();
            assert!(stats.succeeded);
            // both executions are returned
            assert!(stats.bytes_transferred > single);
        }
    }

    #[test]
    fn store_failures_surface() {
        let store = metastore_test::seeded_store(1, 10);
        let artifacts = store.list_node_ids(NodeKind::Artifact).unwrap();
        let contexts = store.list_node_ids(NodeKind::Context).unwrap();
        store
            .insert_edges(EdgeKind::Attribution, &[(artifacts[0], contexts[0])])
            .unwrap();

        let config = ReadNodesViaContextEdgesConfig::new(ReadSpecification::ContextsByArtifact);
        let mut workload = ReadNodesViaContextEdges::new(config, 2, 0);
        workload.prepare(&store).unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            workload.execute(0, &store),
            Err(WorkloadError::StoreOperationFailed(_))
        ));

        store.set_unavailable(false);
        assert!(workload.execute(1, &store).unwrap().succeeded);
    }
}
