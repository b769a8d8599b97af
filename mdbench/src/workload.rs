//! The [`Workload`] abstraction and its two families.
//!
//! A workload is bound to one [`WorkloadConfig`] and follows a two-phase contract:
//!
//!  1. [`prepare`](Workload::prepare) runs once, single-threaded, and plans exactly
//!     `num_operations` work items from the current contents of the store.
//!  2. [`execute`](Workload::execute) runs the planned operation at an index. Work items are
//!     read-only after preparation, so concurrent calls for distinct indices need no locking.
//!
//! Use [`create_workload`] to construct the family selected by a configuration.

use std::fmt;

use metastore_service::MetadataStore;

use crate::config::{WorkloadConfig, WorkloadKind};
use crate::error::{Result, WorkloadError};
use crate::stats::OpStats;

mod fill_context_edges;
mod read_nodes_via_context_edges;

pub use fill_context_edges::FillContextEdges;
pub use read_nodes_via_context_edges::ReadNodesViaContextEdges;

/// A benchmark workload driving operations against a [`MetadataStore`].
pub trait Workload: fmt::Debug + Send + Sync {
    /// Name of the workload for identification in logs and reports.
    fn name(&self) -> &str;

    /// The configured number of operations.
    fn num_operations(&self) -> usize;

    /// Plans all work items.
    ///
    /// On failure, no work items are retained and the workload stays unprepared.
    fn prepare(&mut self, store: &dyn MetadataStore) -> Result<()>;

    /// Runs the operation planned at `index`.
    ///
    /// Store failures are returned as [`WorkloadError::StoreOperationFailed`] without retrying.
    fn execute(&self, index: usize, store: &dyn MetadataStore) -> Result<OpStats>;

    /// Releases the work items. The workload cannot execute afterwards.
    fn tear_down(&mut self);
}

/// Creates the workload selected by `config`.
///
/// Without a configured seed, work items are planned from a random seed.
pub fn create_workload(config: &WorkloadConfig) -> Result<Box<dyn Workload>> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);

    let workload: Box<dyn Workload> = match &config.kind {
        WorkloadKind::FillContextEdges(fill) => Box::new(FillContextEdges::new(
            fill.clone(),
            config.num_operations,
            seed,
        )),
        WorkloadKind::ReadNodesViaContextEdges(read) => Box::new(ReadNodesViaContextEdges::new(
            read.clone(),
            config.num_operations,
            seed,
        )),
    };

    Ok(workload)
}

/// Lifecycle of the work items of a workload.
#[derive(Debug)]
enum WorkItems<T> {
    Uninitialized,
    Prepared(Vec<T>),
    Done,
}

impl<T> WorkItems<T> {
    /// Fails unless items can still be prepared.
    fn ensure_uninitialized(&self) -> Result<()> {
        match self {
            Self::Uninitialized => Ok(()),
            Self::Prepared(_) | Self::Done => Err(WorkloadError::AlreadyPrepared),
        }
    }

    fn get(&self, index: usize) -> Result<&T> {
        let Self::Prepared(items) = self else {
            return Err(WorkloadError::NotPrepared);
        };
        items.get(index).ok_or(WorkloadError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }

    fn as_slice(&self) -> &[T] {
        match self {
            Self::Prepared(items) => items,
            Self::Uninitialized | Self::Done => &[],
        }
    }
}
