//! Diagnostics for the logging subsystem itself.
//!
//! Configuration fallbacks, sink failures and redirection are reported
//! through `tracing`. Hosts that do not redirect ambient output into the
//! facade can install a plain subscriber for them here.

use tracing::{Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Initialize diagnostics at `warn`, overridable with RUST_LOG
pub fn init_diagnostics() -> bool {
    init_diagnostics_with_level("warn")
}

/// Initialize diagnostics with a specific default level.
///
/// Writes compact lines to standard error. Returns `false` when a global
/// subscriber is already installed.
pub fn init_diagnostics_with_level(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Compact `warn`-and-above layer for this crate's own targets only.
///
/// Composed next to the facade layer when ambient output is redirected, so
/// sink failures still reach `make_writer` while the facade ignores them.
pub fn diagnostics_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .compact()
        .with_ansi(false)
        .with_writer(make_writer)
        .with_filter(Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::WARN))
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
