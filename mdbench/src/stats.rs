//! Statistics of executed operations.
//!
//! Every executed operation yields an [`OpStats`]. Workers fold these into a shared
//! [`ThreadStats`], which keeps running totals and a latency sketch for a measurement window.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use sketches_ddsketch::{DDSketch, DDSketchError};

/// Outcome of a single operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpStats {
    /// Whether the operation completed without error.
    pub succeeded: bool,
    /// Wall time of the operation.
    pub elapsed: Duration,
    /// Payload bytes written or read.
    pub bytes_transferred: u64,
}

impl OpStats {
    /// A successful operation.
    pub fn success(elapsed: Duration, bytes_transferred: u64) -> Self {
        Self {
            succeeded: true,
            elapsed,
            bytes_transferred,
        }
    }

    /// A failed operation, which transferred nothing.
    pub fn failure(elapsed: Duration) -> Self {
        Self {
            succeeded: false,
            elapsed,
            bytes_transferred: 0,
        }
    }
}

#[derive(Clone, Default)]
struct Totals {
    start: Option<Instant>,
    finish: Option<Instant>,

    done: u64,
    failed: u64,
    bytes: u64,

    /// Latency of successful operations, in seconds.
    latency: DDSketch,

    next_report: u64,
}

/// Returns the progress threshold following `current`.
///
/// Steps grow with the count so that long runs do not flood the log.
fn next_report_after(current: u64) -> u64 {
    let step = match current {
        0..1_000 => 100,
        1_000..5_000 => 500,
        5_000..10_000 => 1_000,
        10_000..50_000 => 5_000,
        50_000..100_000 => 10_000,
        100_000..500_000 => 50_000,
        _ => 100_000,
    };
    current + step
}

/// Running totals of all operations folded in during a measurement window.
///
/// The totals are guarded by a mutex, so a single instance can be shared by reference among all
/// concurrent workers.
#[derive(Default)]
pub struct ThreadStats {
    totals: Mutex<Totals>,
}

impl ThreadStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Totals> {
        self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the measurement window.
    pub fn start(&self) {
        let mut totals = self.lock();
        totals.start = Some(Instant::now());
        totals.finish = None;
    }

    /// Closes the measurement window.
    pub fn stop(&self) {
        self.lock().finish = Some(Instant::now());
    }

    /// Folds one operation into the totals.
    ///
    /// Failed operations count towards [`done`](Self::done) as well. `running_total` is the
    /// caller's own count of operations and is incremented alongside.
    pub fn update(&self, op_stats: &OpStats, running_total: &mut u64) {
        let mut totals = self.lock();

        totals.done += 1;
        totals.bytes += op_stats.bytes_transferred;
        if op_stats.succeeded {
            totals.latency.add(op_stats.elapsed.as_secs_f64());
        } else {
            totals.failed += 1;
        }
        *running_total += 1;

        if totals.next_report == 0 {
            totals.next_report = next_report_after(0);
        }
        if totals.done >= totals.next_report {
            tracing::debug!(done = totals.done, failed = totals.failed, "progress");
            totals.next_report = next_report_after(totals.next_report);
        }
    }

    /// Adds the totals of `other` to these.
    ///
    /// The measurement window becomes the union of both windows.
    pub fn merge(&self, other: &ThreadStats) -> Result<(), DDSketchError> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }

        let other = other.lock().clone();
        let mut totals = self.lock();

        totals.done += other.done;
        totals.failed += other.failed;
        totals.bytes += other.bytes;
        totals.latency.merge(&other.latency)?;

        totals.start = match (totals.start, other.start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        totals.finish = match (totals.finish, other.finish) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        Ok(())
    }

    /// Number of operations folded in, including failed ones.
    pub fn done(&self) -> u64 {
        self.lock().done
    }

    /// Number of failed operations.
    pub fn failed(&self) -> u64 {
        self.lock().failed
    }

    /// Total bytes transferred.
    pub fn bytes(&self) -> u64 {
        self.lock().bytes
    }

    /// Length of the measurement window.
    ///
    /// A window that was started but not stopped extends to now.
    pub fn elapsed(&self) -> Duration {
        let totals = self.lock();
        match totals.start {
            Some(start) => totals
                .finish
                .unwrap_or_else(Instant::now)
                .saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// Summarizes the totals under the given name.
    pub fn report(&self, name: impl Into<String>) -> Report {
        let elapsed = self.elapsed();
        let totals = self.lock();

        let latency = (totals.latency.count() > 0).then(|| {
            let quantile = |q| {
                let secs = totals.latency.quantile(q).ok().flatten().unwrap_or_default();
                Duration::from_secs_f64(secs.max(0.0))
            };
            let sum = totals.latency.sum().unwrap_or_default();
            LatencySummary {
                avg: Duration::from_secs_f64(sum / totals.latency.count() as f64),
                p50: quantile(0.5),
                p90: quantile(0.9),
                p99: quantile(0.99),
            }
        });

        Report {
            name: name.into(),
            done: totals.done,
            failed: totals.failed,
            bytes: totals.bytes,
            elapsed,
            latency,
        }
    }
}

impl fmt::Debug for ThreadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.lock();
        f.debug_struct("ThreadStats")
            .field("done", &totals.done)
            .field("failed", &totals.failed)
            .field("bytes", &totals.bytes)
            .finish_non_exhaustive()
    }
}

/// Latency percentiles of successful operations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatencySummary {
    /// Mean latency.
    pub avg: Duration,
    /// Median latency.
    pub p50: Duration,
    /// 90th percentile.
    pub p90: Duration,
    /// 99th percentile.
    pub p99: Duration,
}

/// Final figures of one workload.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Name of the workload.
    pub name: String,
    /// Operations executed, including failures.
    pub done: u64,
    /// Failed operations.
    pub failed: u64,
    /// Bytes transferred.
    pub bytes: u64,
    /// Length of the measurement window.
    pub elapsed: Duration,
    /// Latency of successful operations, if there were any.
    pub latency: Option<LatencySummary>,
}

impl Report {
    /// Operations per second over the measurement window.
    pub fn ops_per_sec(&self) -> f64 {
        per_sec(self.done, self.elapsed)
    }

    /// Bytes per second over the measurement window.
    pub fn bytes_per_sec(&self) -> f64 {
        per_sec(self.bytes, self.elapsed)
    }
}

fn per_sec(total: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { total as f64 / secs } else { 0.0 }
}
