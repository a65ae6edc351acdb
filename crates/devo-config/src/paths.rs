//! Well-known filesystem locations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::env;
use crate::error::ConfigError;

#[cfg(not(windows))]
const CONFIG_DIR_NAME: &str = ".devo.d";
#[cfg(not(windows))]
const CONFIG_FILE_NAME: &str = ".devoconfig";
#[cfg(windows)]
const CONFIG_DIR_NAME: &str = "devo.d";
#[cfg(windows)]
const CONFIG_FILE_NAME: &str = "devo.config";

const PLUGINS_DIR_NAME: &str = "plugins";

/// Directory holding per-user devo state.
///
/// `~/.devo.d` on Unix-like systems, `%APPDATA%\devo.d` on Windows.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirectory`] when the base directory cannot be
/// determined.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_directory()?.join(CONFIG_DIR_NAME))
}

/// Default location of the configuration file.
///
/// `~/.devoconfig` on Unix-like systems, `%APPDATA%\devo.config` on Windows.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirectory`] when the base directory cannot be
/// determined.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_directory()?.join(CONFIG_FILE_NAME))
}

/// Per-user plugin directory searched during discovery.
///
/// # Errors
///
/// Returns [`ConfigError::HomeDirectory`] when the base directory cannot be
/// determined.
pub fn plugins_dir() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(PLUGINS_DIR_NAME))
}

/// Root directory for temporary diagnostic files.
///
/// Honours `DEVO_TMP_DIR` (made absolute) and otherwise falls back to the
/// operating system's temporary directory.
///
/// # Errors
///
/// Returns [`ConfigError::ResolvePath`] when the override cannot be made
/// absolute.
pub fn temp_root() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(env::TMP_DIR).filter(|value| !value.is_empty()) {
        Some(value) => absolute(Path::new(&value)),
        None => Ok(std::env::temp_dir()),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::ResolvePath {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })
}

#[cfg(not(windows))]
fn base_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeDirectory)
}

#[cfg(windows)]
fn base_directory() -> Result<PathBuf, ConfigError> {
    dirs::config_dir().ok_or(ConfigError::HomeDirectory)
}
