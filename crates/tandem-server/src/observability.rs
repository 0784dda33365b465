//! Tracing initialization with a configurable log level.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes priority over the configured level so operators can
/// raise verbosity without touching the config file. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
