//! Logging and tracing configuration
//!
//! All harness logs go to stderr. Stdout is reserved for test reports so
//! that nothing the harness prints can be confused with a captured payload.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies; `verbose`
/// raises the crate to DEBUG so spawned commands are shown.
pub fn init_cli(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("flex_testbed=debug,warn")
        } else {
            EnvFilter::new("flex_testbed=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing inside tests
///
/// Output goes through the test writer so it is captured per test. Safe to
/// call from every test; only the first call installs a subscriber.
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flex_testbed=debug"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().with_target(true).compact())
        .try_init();
}
