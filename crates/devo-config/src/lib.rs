//! Shared configuration for the devo command-line host.
//!
//! The crate owns the schema of the user configuration file, the well-known
//! locations devo reads from (configuration directory, plugin directory and
//! the temporary root for diagnostic files), and the environment variables
//! the supervising parent and its child agree on.
//!
//! Decoding is deliberately forgiving: unknown fields are ignored and absent
//! fields keep their defaults, so configuration files written for newer
//! releases keep loading.

mod defaults;
pub mod env;
mod error;
mod file;
mod logging;
mod paths;

pub use defaults::{
    DEFAULT_CHILD_LOG_FILTER, DEFAULT_PLUGIN_MAX_PORT, DEFAULT_PLUGIN_MIN_PORT, default_log_format,
};
pub use error::ConfigError;
pub use file::Config;
pub use logging::{LogDestination, LogFormat, LogFormatParseError, LogSettings};
pub use paths::{config_dir, config_file, plugins_dir, temp_root};
