//! Run workloads against a store with concurrent workers and print their reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};
use metastore_service::MetadataStore;
use yansi::Paint;

use crate::config::WorkloadConfig;
use crate::error::WorkloadError;
use crate::stats::{OpStats, Report, ThreadStats};
use crate::workload::{Workload, create_workload};

/// Runs the given workloads one after another against the store.
///
/// Each workload is prepared before any of its operations run. Its operations are then executed
/// by `concurrency` workers that share one [`ThreadStats`]. A failed `prepare` aborts the whole
/// run, while failed store operations are tallied and the run continues.
pub async fn run(
    store: Arc<dyn MetadataStore>,
    workloads: Vec<WorkloadConfig>,
    concurrency: usize,
    tick: Duration,
) -> Result<Vec<Report>> {
    let total = ThreadStats::new();
    let mut reports = Vec::with_capacity(workloads.len());

    for config in workloads {
        let (report, stats) = run_workload(Arc::clone(&store), config, concurrency, tick).await?;

        println!();
        println!(
            "{} {} (concurrency: {})",
            "## Workload".bold(),
            report.name.bold().blue(),
            concurrency.bold()
        );
        print_report(&report);

        total
            .merge(&stats)
            .map_err(|err| anyhow::anyhow!("failed to merge statistics: {err:?}"))?;
        reports.push(report);
    }

    if reports.len() > 1 {
        println!();
        println!("{}", "## TOTALS".bold());
        print_report(&total.report("TOTALS"));
    }

    Ok(reports)
}

async fn run_workload(
    store: Arc<dyn MetadataStore>,
    config: WorkloadConfig,
    concurrency: usize,
    tick: Duration,
) -> Result<(Report, Arc<ThreadStats>)> {
    let mut workload = create_workload(&config).context("invalid workload configuration")?;
    let name = workload.name().to_owned();
    let num_operations = workload.num_operations();
    tracing::info!(workload = %name, num_operations, "preparing workload");

    // prepare runs to completion before any operation is issued
    let prepare_store = Arc::clone(&store);
    let workload = tokio::task::spawn_blocking(move || -> Result<_, WorkloadError> {
        workload.prepare(&*prepare_store)?;
        Ok(workload)
    })
    .await?
    .with_context(|| format!("failed to prepare workload {name}"))?;
    let mut workload: Arc<dyn Workload> = Arc::from(workload);

    let bar = ProgressBar::new(num_operations as u64)
        .with_style(ProgressStyle::with_template(
            "{spinner} {msg} {wide_bar} {pos}/{len} {elapsed}",
        )?)
        .with_message(format!("Running {name}"));
    bar.enable_steady_tick(tick);

    let stats = Arc::new(ThreadStats::new());
    let next_index = Arc::new(AtomicUsize::new(0));
    let abort = Arc::new(AtomicBool::new(false));

    stats.start();
    let workers: Vec<_> = (0..concurrency.clamp(1, num_operations.max(1)))
        .map(|_| {
            let worker = Worker {
                workload: Arc::clone(&workload),
                store: Arc::clone(&store),
                stats: Arc::clone(&stats),
                next_index: Arc::clone(&next_index),
                abort: Arc::clone(&abort),
                progress: bar.clone(),
            };
            tokio::task::spawn_blocking(move || worker.run())
        })
        .collect();

    let finished = futures::future::join_all(workers).await;
    stats.stop();
    bar.finish_and_clear();

    for result in finished {
        result?.with_context(|| format!("workload {name} aborted"))?;
    }

    // all workers are joined, so this is the last handle
    if let Some(workload) = Arc::get_mut(&mut workload) {
        workload.tear_down();
    }

    let report = stats.report(name);
    tracing::info!(
        workload = %report.name,
        done = report.done,
        failed = report.failed,
        bytes = report.bytes,
        "workload finished"
    );

    Ok((report, stats))
}

/// Executes operations until the shared index runs past the end or another worker aborts.
struct Worker {
    workload: Arc<dyn Workload>,
    store: Arc<dyn MetadataStore>,
    stats: Arc<ThreadStats>,
    next_index: Arc<AtomicUsize>,
    abort: Arc<AtomicBool>,
    progress: ProgressBar,
}

impl Worker {
    fn run(self) -> Result<u64, WorkloadError> {
        let mut done = 0;

        while !self.abort.load(Ordering::Relaxed) {
            let index = self.next_index.fetch_add(1, Ordering::Relaxed);
            if index >= self.workload.num_operations() {
                break;
            }

            if let Err(err) = run_op(&*self.workload, index, &*self.store, &self.stats, &mut done) {
                self.abort.store(true, Ordering::Relaxed);
                return Err(err);
            }
            self.progress.inc(1);
        }

        Ok(done)
    }
}

/// Executes one operation and folds its outcome into `stats`.
///
/// Store failures are tallied as failed operations. Any other error means the workload was
/// driven incorrectly and is returned.
fn run_op(
    workload: &dyn Workload,
    index: usize,
    store: &dyn MetadataStore,
    stats: &ThreadStats,
    running_total: &mut u64,
) -> Result<(), WorkloadError> {
    let start = Instant::now();
    let op_stats = match workload.execute(index, store) {
        Ok(op_stats) => op_stats,
        Err(WorkloadError::StoreOperationFailed(error)) => {
            tracing::warn!(
                error = &error as &dyn std::error::Error,
                workload = workload.name(),
                index,
                "operation failed"
            );
            OpStats::failure(start.elapsed())
        }
        Err(err) => return Err(err),
    };

    stats.update(&op_stats, running_total);
    Ok(())
}

fn print_report(report: &Report) {
    print!("{} ({} ops", "OPERATIONS:".bold().green(), report.done.bold());
    if report.failed > 0 {
        print!(
            ", {}",
            format!("{} FAILURES", report.failed).bold().red()
        );
    }
    println!(")");

    let throughput = ByteSize::b(report.bytes_per_sec() as u64);
    println!(
        "  {:.2} operations/s, {:.2}/s ({} in {:.2?})",
        report.ops_per_sec().bold(),
        throughput.bold(),
        ByteSize::b(report.bytes),
        report.elapsed
    );

    if let Some(latency) = &report.latency {
        println!(
            "  avg: {:.2?}; p50: {:.2?}; p90: {:.2?}; p99: {:.2?}",
            latency.avg.bold(),
            latency.p50,
            latency.p90,
            latency.p99
        );
    }
}
