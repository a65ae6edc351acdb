use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::defaults::{DEFAULT_CHILD_LOG_FILTER, default_log_format};
use crate::env;
use crate::error::ConfigError;

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Where the general (user requested) log stream is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Logging was not requested; output is dropped.
    Discard,
    /// Log lines are written to the parent's standard error.
    Stderr,
    /// Log lines are written to a file, truncated on open.
    File(PathBuf),
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    destination: LogDestination,
    filter: String,
    format: LogFormat,
}

impl LogSettings {
    /// Resolves settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LogFormat`] when `DEVO_LOG_FORMAT` names an
    /// unknown format.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LogFormat`] when the format variable names an
    /// unknown format.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(env::LOG).is_some_and(|value| !value.is_empty() && value != "0");
        let destination = if enabled {
            match lookup(env::LOG_PATH).filter(|path| !path.is_empty()) {
                Some(path) => LogDestination::File(PathBuf::from(path)),
                None => LogDestination::Stderr,
            }
        } else {
            LogDestination::Discard
        };
        let filter = lookup(env::LOG_FILTER)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHILD_LOG_FILTER.to_owned());
        let format = match lookup(env::LOG_FORMAT) {
            Some(value) if !value.is_empty() => value
                .parse::<LogFormat>()
                .map_err(|source| ConfigError::LogFormat { value, source })?,
            _ => default_log_format(),
        };
        Ok(Self {
            destination,
            filter,
            format,
        })
    }

    /// Destination of the general log stream.
    #[must_use]
    pub const fn destination(&self) -> &LogDestination {
        &self.destination
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Line format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}
