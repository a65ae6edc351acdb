//! Environment variables shared between the supervising parent, its child,
//! and plugin processes.

/// Marks a process as the supervised child of a devo parent.
pub const WRAPPED_COOKIE_KEY: &str = "DEVO_WRAPPED_COOKIE";

/// Value paired with [`WRAPPED_COOKIE_KEY`].
pub const WRAPPED_COOKIE_VALUE: &str = "7c28215aca87789f95b406b8dd91aa5198406750";

/// Marks a process launched as a plugin's own child.
pub const PLUGIN_COOKIE_KEY: &str = "PACKER_PLUGIN_MAGIC_COOKIE";

/// Value paired with [`PLUGIN_COOKIE_KEY`].
pub const PLUGIN_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

/// Identifier shared by every process taking part in one run.
pub const RUN_ID: &str = "DEVO_RUN_UUID";

/// Enables the general log destination when set to anything but `0`.
pub const LOG: &str = "DEVO_LOG";

/// Redirects the general log destination to a file.
pub const LOG_PATH: &str = "DEVO_LOG_PATH";

/// Tracing filter applied by the child.
pub const LOG_FILTER: &str = "DEVO_LOG_FILTER";

/// Log line format (`compact` or `json`).
pub const LOG_FORMAT: &str = "DEVO_LOG_FORMAT";

/// Overrides the root directory for temporary diagnostic files.
pub const TMP_DIR: &str = "DEVO_TMP_DIR";

/// Overrides the configuration file location.
pub const CONFIG: &str = "DEVO_CONFIG";

/// Returns `true` when the plugin cookie is present with its expected value.
#[must_use]
pub fn inside_plugin() -> bool {
    std::env::var(PLUGIN_COOKIE_KEY).is_ok_and(|value| value == PLUGIN_COOKIE_VALUE)
}

/// Returns `true` when this process runs as a supervised child.
#[must_use]
pub fn wrapped() -> bool {
    std::env::var(WRAPPED_COOKIE_KEY).is_ok_and(|value| value == WRAPPED_COOKIE_VALUE)
}
