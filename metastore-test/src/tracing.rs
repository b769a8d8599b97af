use tracing_subscriber::EnvFilter;

/// Store and benchmark crates log at `DEBUG` in tests, everything else only on errors.
const DEFAULT_FILTER: &str = "ERROR,mdbench=DEBUG,metastore_service=DEBUG,metastore_types=DEBUG";

/// Routes logs of a test run into the output captured by the test harness.
///
/// `RUST_LOG` replaces the default filter, e.g. to trace the store during a single failing test.
/// Calling this more than once per process is fine, later calls keep the first subscriber.
///
/// # Example
///
/// ```
/// metastore_test::tracing::init();
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .compact()
        .try_init()
        .ok();
}
