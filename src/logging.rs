//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber at `level` (e.g. "info", "debug"). `RUST_LOG`
/// takes precedence when set. Calling this again after a subscriber is
/// installed does nothing.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .try_init();
}
