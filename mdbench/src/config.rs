//! Benchmark configuration.
//!
//! The benchmark is configured through a YAML file. Each entry of `workloads` selects exactly one
//! workload family through its key and carries the number of operations to run:
//!
//! ```yaml
//! concurrency: 8
//! seed: 42
//! report_interval: 500ms
//!
//! database:
//!   types: { artifacts: 100, executions: 100, contexts: 100 }
//!   nodes: { artifacts: 1000, executions: 1000, contexts: 100 }
//!
//! workloads:
//!   - num_operations: 500
//!     fill_context_edges:
//!       specification: attribution
//!       non_context_node_popularity: { dirichlet_alpha: 1000 }
//!       context_node_popularity: { dirichlet_alpha: 1 }
//!       num_edges: { minimum: 1, maximum: 10 }
//!   - num_operations: 500
//!     read_nodes_via_context_edges:
//!       specification: artifacts_by_context
//! ```

use std::num::NonZero;
use std::path::Path;
use std::thread::available_parallelism;
use std::time::Duration;

use anyhow::Context;
use metastore_service::populate::PerKind;
use metastore_types::{EdgeKind, NodeKind};
use serde::Deserialize;

use crate::error::{Result, WorkloadError};

/// Top-level configuration of a benchmark run.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Number of workers executing operations concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Base seed for all workloads that do not specify their own.
    ///
    /// Without any seed, every run samples different work items.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Refresh interval of the progress display.
    #[serde(default = "default_report_interval", with = "humantime_serde")]
    pub report_interval: Duration,

    /// Data to seed the store with before any workload runs.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// The workloads to run, in order.
    pub workloads: Vec<WorkloadConfig>,
}

fn default_concurrency() -> usize {
    available_parallelism().map_or(1, NonZero::get)
}

fn default_report_interval() -> Duration {
    Duration::from_secs(1)
}

impl Config {
    /// Loads and validates the configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path).context("failed to open config file")?;
        Self::from_reader(file)
    }

    /// Parses and validates the configuration from YAML.
    pub fn from_reader(reader: impl std::io::Read) -> anyhow::Result<Self> {
        let mut config: Config =
            serde_yaml::from_reader(reader).context("failed to parse config YAML")?;

        if config.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        for (index, workload) in config.workloads.iter_mut().enumerate() {
            workload
                .validate()
                .with_context(|| format!("invalid workload #{index}"))?;

            if workload.seed.is_none() {
                workload.seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
            }
        }

        Ok(config)
    }
}

/// Number of types and nodes to seed the store with.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Number of types per node kind.
    #[serde(default)]
    pub types: KindCounts,
    /// Number of nodes per node kind.
    #[serde(default)]
    pub nodes: KindCounts,
}

/// A count per node kind.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct KindCounts {
    /// Artifacts.
    pub artifacts: usize,
    /// Executions.
    pub executions: usize,
    /// Contexts.
    pub contexts: usize,
}

impl From<KindCounts> for PerKind {
    fn from(counts: KindCounts) -> Self {
        PerKind {
            artifacts: counts.artifacts,
            executions: counts.executions,
            contexts: counts.contexts,
        }
    }
}

/// Configuration of a single workload.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkloadConfig {
    /// The number of operations to prepare and execute. Zero is legal.
    pub num_operations: usize,

    /// Seed of the work item generator, random if absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// The workload family and its parameters.
    #[serde(flatten)]
    pub kind: WorkloadKind,
}

impl WorkloadConfig {
    /// Creates a configuration without a fixed seed.
    pub fn new(num_operations: usize, kind: impl Into<WorkloadKind>) -> Self {
        Self {
            num_operations,
            seed: None,
            kind: kind.into(),
        }
    }

    /// Fixes the seed of the work item generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the constraints that the type system does not capture.
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            WorkloadKind::FillContextEdges(config) => {
                config.non_context_node_popularity.validate()?;
                config.context_node_popularity.validate()?;
                config.num_edges.validate()
            }
            WorkloadKind::ReadNodesViaContextEdges(config) => config
                .node_popularity
                .as_ref()
                .map_or(Ok(()), PopularityConfig::validate),
        }
    }
}

/// One configuration per workload family.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    /// Inserts attributions or associations.
    FillContextEdges(FillContextEdgesConfig),
    /// Reads nodes connected to an anchor node.
    ReadNodesViaContextEdges(ReadNodesViaContextEdgesConfig),
}

impl From<FillContextEdgesConfig> for WorkloadKind {
    fn from(config: FillContextEdgesConfig) -> Self {
        Self::FillContextEdges(config)
    }
}

impl From<ReadNodesViaContextEdgesConfig> for WorkloadKind {
    fn from(config: ReadNodesViaContextEdgesConfig) -> Self {
        Self::ReadNodesViaContextEdges(config)
    }
}

/// Skew of the selection of existing nodes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PopularityConfig {
    /// Concentration of a symmetric Dirichlet distribution over the population.
    ///
    /// Large values make all nodes about equally popular, small values concentrate the selection
    /// on a few hot nodes.
    pub dirichlet_alpha: f64,
}

impl PopularityConfig {
    /// Creates a popularity with the given concentration.
    pub fn new(dirichlet_alpha: f64) -> Self {
        Self { dirichlet_alpha }
    }

    fn validate(&self) -> Result<()> {
        if self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0 {
            Ok(())
        } else {
            Err(WorkloadError::InvalidConfig(format!(
                "dirichlet_alpha must be a positive number, got {}",
                self.dirichlet_alpha
            )))
        }
    }
}

/// Inclusive range of edges inserted per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct EdgeCountRange {
    /// Smallest number of edges, at least 1.
    pub minimum: usize,
    /// Largest number of edges.
    pub maximum: usize,
}

impl EdgeCountRange {
    /// Creates a new range.
    pub fn new(minimum: usize, maximum: usize) -> Self {
        Self { minimum, maximum }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.minimum == 0 {
            return Err(WorkloadError::InvalidConfig(
                "num_edges.minimum must be at least 1".into(),
            ));
        }
        if self.minimum > self.maximum {
            return Err(WorkloadError::InvalidConfig(format!(
                "num_edges.minimum ({}) exceeds num_edges.maximum ({})",
                self.minimum, self.maximum
            )));
        }
        Ok(())
    }
}

/// Which kind of context edge a fill workload creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillSpecification {
    /// Artifact → Context.
    Attribution,
    /// Execution → Context.
    Association,
}

impl FillSpecification {
    /// Both specifications.
    pub const ALL: [FillSpecification; 2] = [Self::Attribution, Self::Association];

    /// The edge kind created by this specification.
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            Self::Attribution => EdgeKind::Attribution,
            Self::Association => EdgeKind::Association,
        }
    }

    /// Upper-case name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Attribution => "ATTRIBUTION",
            Self::Association => "ASSOCIATION",
        }
    }
}

/// Configuration of the `FillContextEdges` workload.
#[derive(Clone, Debug, Deserialize)]
pub struct FillContextEdgesConfig {
    /// The kind of edges to insert.
    pub specification: FillSpecification,
    /// Popularity of the artifacts or executions.
    pub non_context_node_popularity: PopularityConfig,
    /// Popularity of the contexts.
    pub context_node_popularity: PopularityConfig,
    /// Edges per operation.
    pub num_edges: EdgeCountRange,
}

/// Which nodes a read workload fetches, and from which anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadSpecification {
    /// Artifacts attributed to a context.
    ArtifactsByContext,
    /// Executions associated with a context.
    ExecutionsByContext,
    /// Contexts an artifact is attributed to.
    ContextsByArtifact,
    /// Contexts an execution is associated with.
    ContextsByExecution,
}

impl ReadSpecification {
    /// All specifications.
    pub const ALL: [ReadSpecification; 4] = [
        Self::ArtifactsByContext,
        Self::ExecutionsByContext,
        Self::ContextsByArtifact,
        Self::ContextsByExecution,
    ];

    /// The kind of the node whose neighbors are fetched.
    pub fn anchor_kind(self) -> NodeKind {
        match self {
            Self::ArtifactsByContext | Self::ExecutionsByContext => NodeKind::Context,
            Self::ContextsByArtifact => NodeKind::Artifact,
            Self::ContextsByExecution => NodeKind::Execution,
        }
    }

    /// The kind of the fetched nodes.
    pub fn target_kind(self) -> NodeKind {
        match self {
            Self::ArtifactsByContext => NodeKind::Artifact,
            Self::ExecutionsByContext => NodeKind::Execution,
            Self::ContextsByArtifact | Self::ContextsByExecution => NodeKind::Context,
        }
    }

    /// The kind of edge traversed.
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            Self::ArtifactsByContext | Self::ContextsByArtifact => EdgeKind::Attribution,
            Self::ExecutionsByContext | Self::ContextsByExecution => EdgeKind::Association,
        }
    }

    /// Upper-case name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::ArtifactsByContext => "ARTIFACTS_BY_CONTEXT",
            Self::ExecutionsByContext => "EXECUTIONS_BY_CONTEXT",
            Self::ContextsByArtifact => "CONTEXTS_BY_ARTIFACT",
            Self::ContextsByExecution => "CONTEXTS_BY_EXECUTION",
        }
    }
}

/// Configuration of the `ReadNodesViaContextEdges` workload.
#[derive(Clone, Debug, Deserialize)]
pub struct ReadNodesViaContextEdgesConfig {
    /// Anchor and target of every read.
    pub specification: ReadSpecification,
    /// Popularity of the anchor nodes. Anchors are selected uniformly if absent.
    #[serde(default)]
    pub node_popularity: Option<PopularityConfig>,
}

impl ReadNodesViaContextEdgesConfig {
    /// Creates a configuration with uniformly selected anchors.
    pub fn new(specification: ReadSpecification) -> Self {
        Self {
            specification,
            node_popularity: None,
        }
    }
}
