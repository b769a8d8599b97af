//! Logging setup of the benchmark binary.

use std::env;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Installs a global subscriber that logs to stderr.
pub fn init_tracing() {
    let (level, env_filter) = parse_rust_log();
    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(format.with_filter(LevelFilter::from(level)))
        .with(env_filter)
        .init();
}

/// Interprets `RUST_LOG` either as a plain level or as a full filter directive.
pub fn parse_rust_log() -> (Level, EnvFilter) {
    // a bare level caps the output, anything else is taken as the complete filter
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => level,
            Err(_) => return (Level::TRACE, EnvFilter::new(value)),
        },
        Err(_) => Level::INFO,
    };

    // the workspace crates log everything, the level layer then caps them
    let env_filter = EnvFilter::new(
        "WARN,\
        mdbench=TRACE,\
        metastore_service=TRACE,\
        metastore_types=TRACE,\
        ",
    );

    (level, env_filter)
}
