//! Helpers to seed a store with types and nodes.
//!
//! Benchmarks that read or connect existing nodes need a populated store. These helpers create
//! types and nodes with a small, fixed property layout so payload sizes are realistic but stable.

use std::collections::BTreeMap;

use metastore_types::{NodeKind, PropertyType, Value};

use crate::error::{StoreError, StoreResult};
use crate::store::MetadataStore;

/// Number of entities to create per node kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerKind {
    /// Artifacts or artifact types.
    pub artifacts: usize,
    /// Executions or execution types.
    pub executions: usize,
    /// Contexts or context types.
    pub contexts: usize,
}

impl PerKind {
    /// The same count for every kind.
    pub fn uniform(count: usize) -> Self {
        Self {
            artifacts: count,
            executions: count,
            contexts: count,
        }
    }

    /// Returns the count for `kind`.
    pub fn get(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::Artifact => self.artifacts,
            NodeKind::Execution => self.executions,
            NodeKind::Context => self.contexts,
        }
    }
}

fn type_properties() -> BTreeMap<String, PropertyType> {
    BTreeMap::from([
        ("index".to_owned(), PropertyType::Int),
        ("label".to_owned(), PropertyType::String),
        ("weight".to_owned(), PropertyType::Double),
    ])
}

fn node_properties(kind: NodeKind, index: usize) -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("index".to_owned(), Value::Int(index as i64)),
        ("label".to_owned(), Value::String(format!("{kind}-{index:08}"))),
        ("weight".to_owned(), Value::Double(index as f64 / 100.0)),
    ])
}

/// Registers the given number of types per kind.
///
/// Type names are prefixed by the number of types already present, so repeated calls never
/// collide.
pub fn insert_types(store: &dyn MetadataStore, counts: PerKind) -> StoreResult<()> {
    for kind in NodeKind::ALL {
        let existing = store.list_types(kind)?.len();
        for i in 0..counts.get(kind) {
            let name = format!("{kind}_type_{}", existing + i);
            store.put_type(kind, &name, type_properties())?;
        }
        tracing::debug!(%kind, count = counts.get(kind), "inserted types");
    }
    Ok(())
}

/// Inserts the given number of nodes per kind.
///
/// Nodes are spread round-robin over the existing types of their kind. Fails with
/// [`StoreError::InvalidArgument`] if nodes are requested for a kind without any types.
pub fn insert_nodes(store: &dyn MetadataStore, counts: PerKind) -> StoreResult<()> {
    for kind in NodeKind::ALL {
        let count = counts.get(kind);
        if count == 0 {
            continue;
        }

        let types = store.list_types(kind)?;
        if types.is_empty() {
            return Err(StoreError::InvalidArgument(format!(
                "cannot insert {kind} nodes without any {kind} types"
            )));
        }

        let existing = store.list_node_ids(kind)?.len();
        for i in 0..count {
            let index = existing + i;
            let node_type = &types[index % types.len()];
            let properties = node_properties(kind, index);
            store.put_node(kind, node_type.id, &format!("{kind}_{index}"), properties)?;
        }
        tracing::debug!(%kind, count, "inserted nodes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use metastore_types::EntityKind;

    use super::*;
    use crate::InMemoryStore;

    #[test]
    fn populates_every_kind() {
        let store = InMemoryStore::new();
        insert_types(&store, PerKind::uniform(3)).unwrap();
        insert_nodes(&store, PerKind::uniform(10)).unwrap();

        for kind in NodeKind::ALL {
            assert_eq!(store.count(EntityKind::Type(kind)).unwrap(), 3);
            assert_eq!(store.count(EntityKind::Node(kind)).unwrap(), 10);
        }
    }

    #[test]
    fn repeated_calls_append() {
        let store = InMemoryStore::new();
        insert_types(&store, PerKind::uniform(2)).unwrap();
        insert_types(&store, PerKind::uniform(2)).unwrap();
        insert_nodes(&store, PerKind::uniform(1)).unwrap();
        insert_nodes(&store, PerKind::uniform(1)).unwrap();

        assert_eq!(store.count(EntityKind::Type(NodeKind::Context)).unwrap(), 4);
        assert_eq!(store.count(EntityKind::Node(NodeKind::Context)).unwrap(), 2);
    }

    #[test]
    fn nodes_require_types() {
        let store = InMemoryStore::new();
        let counts = PerKind {
            artifacts: 1,
            ..Default::default()
        };

        let result = insert_nodes(&store, counts);
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }
}
