//! Test support for the metadata store and its benchmarks.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod tracing;

use metastore_service::InMemoryStore;
use metastore_service::populate::{self, PerKind};

/// Creates an in-memory store with `types` types and `nodes` nodes of every kind.
///
/// Panics if seeding fails, which only happens for `types == 0 && nodes > 0`.
pub fn seeded_store(types: usize, nodes: usize) -> InMemoryStore {
    let store = InMemoryStore::new();
    populate::insert_types(&store, PerKind::uniform(types)).unwrap();
    populate::insert_nodes(&store, PerKind::uniform(nodes)).unwrap();
    store
}
