//! Process-wide tracing setup shared by the storefront binaries.

pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide tracing with the format taken from `LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
