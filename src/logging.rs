//! Diagnostic tracing, written to stderr and controlled by `RUST_LOG`.
//!
//! User-facing output goes through `colored` printing in [`crate::commands`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. `verbose` raises kickoff's own
/// events to `debug`.
pub fn init(verbose: bool) {
    let default = if verbose { "warn,kickoff=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
