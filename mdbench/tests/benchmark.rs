use std::sync::Arc;
use std::time::Duration;

use mdbench::config::{
    Config, FillSpecification, ReadNodesViaContextEdgesConfig, ReadSpecification, WorkloadConfig,
};
use metastore_service::populate;

mod common;
use common::fill_config;

#[tokio::test(flavor = "multi_thread")]
async fn runs_workloads_in_order() {
    metastore_test::tracing::init();

    let store = metastore_test::seeded_store(10, 100);
    // reads only succeed if the fills before them have run
    let workloads = vec![
        WorkloadConfig::new(100, fill_config(FillSpecification::Attribution)).with_seed(1),
        WorkloadConfig::new(100, fill_config(FillSpecification::Association)).with_seed(2),
        WorkloadConfig::new(
            100,
            ReadNodesViaContextEdgesConfig::new(ReadSpecification::ArtifactsByContext),
        ),
        WorkloadConfig::new(
            100,
            ReadNodesViaContextEdgesConfig::new(ReadSpecification::ContextsByExecution),
        ),
    ];

    let reports = mdbench::run(Arc::new(store), workloads, 4, Duration::from_millis(100))
        .await
        .unwrap();

    let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "FILL_ATTRIBUTION",
            "FILL_ASSOCIATION",
            "READ_ARTIFACTS_BY_CONTEXT",
            "READ_CONTEXTS_BY_EXECUTION"
        ]
    );
    for report in &reports {
        assert_eq!(report.done, 100, "{}", report.name);
        assert_eq!(report.failed, 0, "{}", report.name);
        assert!(report.bytes > 0, "{}", report.name);
        assert!(report.latency.is_some(), "{}", report.name);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_prepare_aborts_the_run() {
    let store = metastore_test::seeded_store(1, 10);
    let workloads = vec![WorkloadConfig::new(
        10,
        ReadNodesViaContextEdgesConfig::new(ReadSpecification::ExecutionsByContext),
    )];

    let err = mdbench::run(Arc::new(store), workloads, 2, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(
        format!("{err:#}").contains("failed to prepare workload READ_EXECUTIONS_BY_CONTEXT"),
        "{err:#}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn runs_from_yaml_config() {
    let yaml = r#"
concurrency: 3
seed: 5
report_interval: 50ms
database:
  types: { artifacts: 5, executions: 5, contexts: 5 }
  nodes: { artifacts: 30, executions: 30, contexts: 10 }
workloads:
  - num_operations: 50
    fill_context_edges:
      specification: association
      non_context_node_popularity: { dirichlet_alpha: 0.5 }
      context_node_popularity: { dirichlet_alpha: 0.5 }
      num_edges: { minimum: 2, maximum: 4 }
  - num_operations: 25
    read_nodes_via_context_edges:
      specification: executions_by_context
      node_popularity: { dirichlet_alpha: 0.1 }
"#;
    let config = Config::from_reader(yaml.as_bytes()).unwrap();

    let store = metastore_service::InMemoryStore::new();
    populate::insert_types(&store, config.database.types.into()).unwrap();
    populate::insert_nodes(&store, config.database.nodes.into()).unwrap();

    let reports = mdbench::run(
        Arc::new(store),
        config.workloads,
        config.concurrency,
        config.report_interval,
    )
    .await
    .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].done, 50);
    assert_eq!(reports[1].done, 25);
    assert!(reports.iter().all(|r| r.bytes > 0));
}
