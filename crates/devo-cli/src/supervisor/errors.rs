//! Error surface for preparing and running the supervised child.

use std::io;
use std::path::PathBuf;

use devo_config::ConfigError;
use thiserror::Error;

use crate::multiplex::MultiplexError;
use crate::telemetry::TelemetryError;

/// Failures before any child is spawned. All of them end the run with exit
/// code 1.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Logging settings in the environment were invalid.
    #[error("couldn't setup log output: {source}")]
    LogSettings {
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },
    /// The requested log file could not be opened.
    #[error("couldn't setup log output '{path}': {source}")]
    LogFile {
        /// Requested log file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The log subscriber could not be installed.
    #[error("couldn't setup log output: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The temporary root directory could not be resolved.
    #[error("couldn't setup logging tempfile: {source}")]
    TempRoot {
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },
    /// The diagnostic temp file could not be created.
    #[error("couldn't setup logging tempfile in '{root}': {source}")]
    TempFile {
        /// Directory the file was to be created in.
        root: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The running executable could not be located for the re-exec.
    #[error("couldn't locate the devo executable: {source}")]
    Executable {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Failures while the child runs or is being drained.
#[derive(Debug, Error)]
pub enum SuperviseError {
    /// The output pipe could not be created.
    #[error("couldn't create the child output pipe: {source}")]
    Pipe {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The child process could not be started.
    #[error("couldn't start devo: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Reading the child's log channel failed.
    #[error("failed to read the child log stream: {source}")]
    LogStream {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Waiting for the child to exit failed.
    #[error("failed to wait for the child process: {source}")]
    Wait {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Forwarding the child's output failed.
    #[error(transparent)]
    Multiplex(#[from] MultiplexError),
    /// The crash handler could not report a crash.
    #[error("failed to report a devo crash: {source}")]
    CrashReport {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
