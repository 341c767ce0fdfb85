//! Shared helpers for querydag's integration tests.

pub mod builders;
pub mod fake_task_fn;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Upper bound for any single async test body.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route `tracing` output through the test harness.
///
/// Output is captured and only shown for failing tests (or with
/// `--nocapture`). `RUST_LOG` picks the filter, default `info`. Calling
/// this from several tests is fine; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
///
/// A scheduler bug usually shows up as a task waiting forever on a signal
/// that never fires; this turns that hang into a failure.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test future did not finish within {TEST_TIMEOUT:?}"),
    }
}
