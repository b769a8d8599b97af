use std::sync::atomic::{AtomicUsize, Ordering};

use mdbench::config::{ReadNodesViaContextEdgesConfig, ReadSpecification, WorkloadConfig};
use mdbench::{ThreadStats, Workload, create_workload};
use metastore_service::MetadataStore;

mod common;
use common::{execute_all, populated_store};

const WORKERS: usize = 8;

/// Executes all operations from `WORKERS` threads, each claiming disjoint indices.
fn execute_concurrently(workload: &dyn Workload, store: &dyn MetadataStore) -> ThreadStats {
    let stats = ThreadStats::new();
    let next_index = AtomicUsize::new(0);

    stats.start();
    std::thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                let mut running_total = 0;
                loop {
                    let index = next_index.fetch_add(1, Ordering::Relaxed);
                    if index >= workload.num_operations() {
                        break;
                    }
                    let op_stats = workload.execute(index, store).unwrap();
                    stats.update(&op_stats, &mut running_total);
                }
            });
        }
    });
    stats.stop();

    stats
}

#[test]
fn concurrent_reads_aggregate_like_sequential_reads() {
    metastore_test::tracing::init();

    for spec in ReadSpecification::ALL {
        let store = populated_store();
        let config =
            WorkloadConfig::new(500, ReadNodesViaContextEdgesConfig::new(spec)).with_seed(21);
        let mut workload = create_workload(&config).unwrap();
        workload.prepare(&store).unwrap();

        let sequential = ThreadStats::new();
        let mut running_total = 0;
        sequential.start();
        for op_stats in execute_all(workload.as_ref(), &store) {
            sequential.update(&op_stats, &mut running_total);
        }
        sequential.stop();

        let concurrent = execute_concurrently(workload.as_ref(), &store);

        assert_eq!(concurrent.done(), 500);
        assert_eq!(concurrent.done(), sequential.done());
        assert_eq!(concurrent.bytes(), sequential.bytes());
        assert_eq!(concurrent.failed(), 0);
    }
}

#[test]
fn concurrent_fills_complete_every_operation() {
    use mdbench::config::FillSpecification;

    let store = metastore_test::seeded_store(10, 100);
    let config = WorkloadConfig::new(400, common::fill_config(FillSpecification::Association));
    let mut workload = create_workload(&config).unwrap();
    workload.prepare(&store).unwrap();

    let stats = execute_concurrently(workload.as_ref(), &store);
    assert_eq!(stats.done(), 400);
    assert_eq!(stats.failed(), 0);
    assert!(stats.bytes() > 0);
}
