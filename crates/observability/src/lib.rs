//! Tracing and logging setup shared by every binary in the workspace.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide logging with the given fallback filter and format.
///
/// `RUST_LOG` wins over `default_filter` when set. Safe to call multiple times;
/// subsequent calls become no-ops.
pub fn init(default_filter: &str, format: LogFormat) {
    tracing::init(default_filter, format);
}
