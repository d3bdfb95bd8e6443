//! Test logging configuration

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `try_init` so it composes with suites that set up their own
/// subscriber.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .with_test_writer()
            .try_init();
    });
}
