//! Tracing setup for the `cyclekit` binary.
//!
//! The core only emits events; installing a subscriber is left to whoever
//! drives it. Events are written to stderr because `predict --json`, `sync`
//! and `note` print JSON on stdout that the host reads back.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the CLI subscriber at WARN
///
/// Rejected parameters and legacy-namespace upgrades surface at this level;
/// set `RUST_LOG=cycle_core=debug` to trace each prediction run.
pub fn init() {
    init_with_level("warn")
}

/// Install the CLI subscriber, filtering at `default_level` unless RUST_LOG is set
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route debug events into the test harness output; safe to call repeatedly
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
