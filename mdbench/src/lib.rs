//! A synthetic workload engine that benchmarks the metadata store.
//!
//! A benchmark consists of [`Workload`]s. Each workload plans a fixed sequence of work items from
//! what currently exists in the store, then executes them, potentially from many workers at once.
//! The outcome of every operation is an [`OpStats`], which workers fold into a shared
//! [`ThreadStats`].
//!
//! Two workload families exist:
//!
//!  - [`FillContextEdges`](workload::FillContextEdges) inserts attributions or associations
//!    between existing nodes and contexts.
//!  - [`ReadNodesViaContextEdges`](workload::ReadNodesViaContextEdges) reads the nodes connected
//!    to an anchor node across existing edges.
//!
//! Existing nodes are picked with a [`PopularitySampler`](popularity::PopularitySampler), which
//! models skewed "hot node" access through a *Dirichlet* distribution.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod benchmark;
pub mod config;
pub mod error;
pub mod generator;
pub mod observability;
pub mod popularity;
pub mod stats;
pub mod workload;

pub use crate::benchmark::run;
pub use crate::error::{Result, WorkloadError};
pub use crate::stats::{OpStats, ThreadStats};
pub use crate::workload::{Workload, create_workload};
