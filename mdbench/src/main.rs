//! Benchmark binary driving synthetic workloads against an in-memory metadata store.
//!
//! The store is seeded with the types and nodes listed in the configuration, then every
//! configured workload runs in order and its report is printed.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use argh::FromArgs;
use mdbench::config::Config;
use metastore_service::{InMemoryStore, populate};

/// Synthetic workload benchmark for the metadata store
#[derive(Debug, FromArgs)]
pub struct Args {
    /// path to the yaml configuration file
    #[argh(option, short = 'c')]
    pub config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    mdbench::observability::init_tracing();

    let config = Config::load(&args.config)?;
    tracing::debug!(?config);

    let store = InMemoryStore::new();
    populate::insert_types(&store, config.database.types.into())
        .context("failed to seed types")?;
    populate::insert_nodes(&store, config.database.nodes.into())
        .context("failed to seed nodes")?;

    mdbench::run(
        Arc::new(store),
        config.workloads,
        config.concurrency,
        config.report_interval,
    )
    .await?;

    Ok(())
}
