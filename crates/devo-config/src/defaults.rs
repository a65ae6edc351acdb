use crate::logging::LogFormat;

/// Lowest port handed out to plugin servers unless configured otherwise.
pub const DEFAULT_PLUGIN_MIN_PORT: u32 = 10_000;

/// Highest port handed out to plugin servers unless configured otherwise.
pub const DEFAULT_PLUGIN_MAX_PORT: u32 = 25_000;

/// Filter used by the child when `DEVO_LOG_FILTER` is unset.
///
/// Debug output is kept so the diagnostic file holds enough context for a
/// crash report.
pub const DEFAULT_CHILD_LOG_FILTER: &str = "debug";

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
