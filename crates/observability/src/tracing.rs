//! Tracing/logging initialization.
//!
//! JSON logs with an env-driven filter. Authorization decisions log through
//! `tracing` with structured fields (`user_id`, `path`, `outcome`), so keep
//! `with_target` off to avoid drowning those fields in module paths.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
