//! One-shot tracing setup for test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Environment variables consulted for the filter, first match wins.
const FILTER_VARS: [&str; 3] = ["CROSSPLANE_TEST_LOG", "TEST_LOG", "RUST_LOG"];

/// Install a test-friendly subscriber.
///
/// Idempotent: later calls are no-ops, and a subscriber installed by someone
/// else is left alone. Output goes through the test writer so cargo captures
/// it per test; timestamps are omitted so output is stable.
///
/// ```bash
/// CROSSPLANE_TEST_LOG=crossplane=debug cargo test -p crossplane
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(resolve_filter())
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

fn resolve_filter() -> EnvFilter {
    FILTER_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
