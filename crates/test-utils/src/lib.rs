pub mod builders;
pub mod fake_reloader;

use supervise::logging::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness writer.
///
/// Reads directives from `SUPERVISE_LOG` (e.g. `SUPERVISE_LOG=debug`),
/// defaulting to `warn`. Output only shows for failing tests unless run
/// with `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Another test already installed the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
