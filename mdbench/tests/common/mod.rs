use mdbench::config::{
    EdgeCountRange, FillContextEdgesConfig, FillSpecification, PopularityConfig, WorkloadConfig,
};
use mdbench::{Workload, create_workload};
use metastore_service::MetadataStore;

pub const NUM_OPERATIONS: usize = 100;
pub const EXISTING_TYPES: usize = 100;
pub const EXISTING_NODES: usize = 100;
pub const EXISTING_CONTEXT_EDGES: usize = 100;

/// Near-uniform popularity with one to ten edges per operation.
pub fn fill_config(specification: FillSpecification) -> FillContextEdgesConfig {
    FillContextEdgesConfig {
        specification,
        non_context_node_popularity: PopularityConfig::new(1000.0),
        context_node_popularity: PopularityConfig::new(1000.0),
        num_edges: EdgeCountRange::new(1, 10),
    }
}

/// Inserts attributions and associations by running fill workloads to completion.
pub fn insert_context_edges(
    store: &dyn MetadataStore,
    num_attributions: usize,
    num_associations: usize,
) -> mdbench::Result<()> {
    for (specification, operations) in [
        (FillSpecification::Attribution, num_attributions),
        (FillSpecification::Association, num_associations),
    ] {
        let config = WorkloadConfig::new(operations, fill_config(specification));
        let mut workload = create_workload(&config)?;
        workload.prepare(store)?;
        for index in 0..workload.num_operations() {
            workload.execute(index, store)?;
        }
    }
    Ok(())
}

/// A store with types, nodes and context edges of every kind.
pub fn populated_store() -> metastore_service::InMemoryStore {
    let store = metastore_test::seeded_store(EXISTING_TYPES, EXISTING_NODES);
    insert_context_edges(&store, EXISTING_CONTEXT_EDGES, EXISTING_CONTEXT_EDGES).unwrap();
    store
}

/// Runs every operation of `workload` in order.
#[allow(dead_code)]
pub fn execute_all(workload: &dyn Workload, store: &dyn MetadataStore) -> Vec<mdbench::OpStats> {
    (0..workload.num_operations())
        .map(|index| workload.execute(index, store).unwrap())
        .collect()
}
