//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Initializes logging for the server binary.
///
/// The filter is read from `RUST_LOG` and defaults to `info`, e.g.
/// `RUST_LOG=pricing_engine=debug`.
///
/// ```no_run
/// pricing_engine::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Initializes debug logging captured by the test harness.
///
/// Safe to call from several tests; only the first call installs a subscriber.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
