//! Tracing setup for the `crossplane` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,reqwest=warn,redis=warn";

/// `CROSSPLANE_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
fn filter() -> EnvFilter {
    std::env::var("CROSSPLANE_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// JSON events on stderr; stdout carries the board and prompts.
pub fn init_tracing() {
    let json = fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    // Someone else's subscriber wins.
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(json)
        .try_init();
}
