//! Tracing and logging setup shared by warden binaries.

/// Initialize process-wide tracing from an explicit configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(config: &LogConfig) {
    tracing::init_with(config);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::LogConfig;
