//! Shared logging/tracing setup for the gateward binaries.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide observability.
///
/// Idempotent: repeated calls after the first are no-ops.
pub fn init() {
    tracing::init();
}
