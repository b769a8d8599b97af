use std::time::Instant;

use metastore_service::MetadataStore;
use metastore_types::NodeKind;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::{WorkItems, Workload};
use crate::config::FillContextEdgesConfig;
use crate::error::Result;
use crate::generator::{EdgeWorkItem, StoreSnapshot, generate_edge_items};
use crate::popularity::DirichletSampler;
use crate::stats::OpStats;

/// Inserts batches of attributions or associations between existing nodes and contexts.
///
/// Both endpoints of every edge are picked by popularity. Inserting an edge that already exists
/// is a legal operation and is measured like any other insert.
#[derive(Debug)]
pub struct FillContextEdges {
    name: String,
    config: FillContextEdgesConfig,
    num_operations: usize,
    seed: u64,
    items: WorkItems<EdgeWorkItem>,
}

impl FillContextEdges {
    /// Creates an unprepared workload.
    pub fn new(config: FillContextEdgesConfig, num_operations: usize, seed: u64) -> Self {
        Self {
            name: format!("FILL_{}", config.specification.name()),
            config,
            num_operations,
            seed,
            items: WorkItems::Uninitialized,
        }
    }

    /// The planned work items, empty unless prepared.
    pub fn work_items(&self) -> &[EdgeWorkItem] {
        self.items.as_slice()
    }
}

impl Workload for FillContextEdges {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_operations(&self) -> usize {
        self.num_operations
    }

    fn prepare(&mut self, store: &dyn MetadataStore) -> Result<()> {
        self.items.ensure_uninitialized()?;

        let edge_kind = self.config.specification.edge_kind();
        let snapshot =
            StoreSnapshot::capture(store, &[edge_kind.non_context_kind(), NodeKind::Context], &[])?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut node_sampler = DirichletSampler::new(rng.next_u64());
        let mut context_sampler = DirichletSampler::new(rng.next_u64());

        let items = generate_edge_items(
            &self.config,
            self.num_operations,
            &snapshot,
            &mut node_sampler,
            &mut context_sampler,
            &mut rng,
        )?;

        tracing::debug!(
            workload = %self.name,
            items = items.len(),
            edges = items.iter().map(EdgeWorkItem::num_edges).sum::<usize>(),
            "prepared work items"
        );
        self.items = WorkItems::Prepared(items);
        Ok(())
    }

    fn execute(&self, index: usize, store: &dyn MetadataStore) -> Result<OpStats> {
        let item = self.items.get(index)?;

        let start = Instant::now();
        let bytes = store.insert_edges(item.kind, &item.endpoints)?;

        Ok(OpStats::success(start.elapsed(), bytes))
    }

    fn tear_down(&mut self) {
        self.items = WorkItems::Done;
    }
}
