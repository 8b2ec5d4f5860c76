//! Tracing/logging setup shared by the binary and its tests.

mod format;

/// Tracing subscriber initialization.
pub mod tracing;

pub use format::{LogFormat, ParseLogFormatError};

/// Initialize process-wide logging in the given format.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
