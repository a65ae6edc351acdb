//! Errors raised while locating or decoding configuration.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors produced by the configuration layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The user's home directory could not be determined.
    #[error("unable to determine the home directory")]
    HomeDirectory,
    /// Resolving a path to an absolute form failed.
    #[error("failed to resolve '{path}': {source}")]
    ResolvePath {
        /// Path that could not be resolved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The configuration document is not valid JSON for the schema.
    #[error("failed to decode configuration: {source}")]
    Decode {
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },
    /// The plugin port range is inverted.
    #[error("PluginMinPort ({min}) must not exceed PluginMaxPort ({max})")]
    PortRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// The log format variable named an unknown format.
    #[error("unsupported log format '{value}': {source}")]
    LogFormat {
        /// Value read from the environment.
        value: String,
        /// Underlying parse error.
        #[source]
        source: strum::ParseError,
    },
}
