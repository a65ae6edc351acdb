//! The user configuration file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_PLUGIN_MAX_PORT, DEFAULT_PLUGIN_MIN_PORT};
use crate::env;
use crate::error::ConfigError;
use crate::paths::config_file;

/// Decoded user configuration.
///
/// Field names follow the on-disk JSON document: `disable_checkpoint`,
/// `disable_checkpoint_signature`, `PluginMinPort`, `PluginMaxPort`,
/// `builders`, `post-processors` and `provisioners`. The plugin maps name
/// plugins explicitly and have the lowest precedence during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    disable_checkpoint: bool,
    disable_checkpoint_signature: bool,
    #[serde(rename = "PluginMinPort", alias = "plugin_min_port")]
    plugin_min_port: u32,
    #[serde(rename = "PluginMaxPort", alias = "plugin_max_port")]
    plugin_max_port: u32,
    #[serde(alias = "Builders")]
    builders: BTreeMap<String, String>,
    #[serde(rename = "post-processors", alias = "PostProcessors")]
    post_processors: BTreeMap<String, String>,
    #[serde(alias = "Provisioners")]
    provisioners: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disable_checkpoint: false,
            disable_checkpoint_signature: false,
            plugin_min_port: DEFAULT_PLUGIN_MIN_PORT,
            plugin_max_port: DEFAULT_PLUGIN_MAX_PORT,
            builders: BTreeMap::new(),
            post_processors: BTreeMap::new(),
            provisioners: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration named by `DEVO_CONFIG`, or the default file.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`config_file`] and [`Config::load_from_path`].
    pub fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var_os(env::CONFIG).filter(|value| !value.is_empty()) {
            Some(value) => PathBuf::from(value),
            None => config_file()?,
        };
        Self::load_from_path(&path)
    }

    /// Loads configuration from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file exists but cannot be
    /// opened, and the errors of [`Config::decode`] otherwise.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        match File::open(path) {
            Ok(file) => Self::decode(BufReader::new(file)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: Arc::new(source),
            }),
        }
    }

    /// Decodes a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] for malformed documents and
    /// [`ConfigError::PortRange`] for an inverted port range. The range is
    /// checked after defaults are applied, so a lone `PluginMaxPort` below
    /// the default minimum of 10000 is rejected too.
    pub fn decode<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_reader(reader).map_err(|source| ConfigError::Decode {
                source: Arc::new(source),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin_min_port > self.plugin_max_port {
            return Err(ConfigError::PortRange {
                min: self.plugin_min_port,
                max: self.plugin_max_port,
            });
        }
        Ok(())
    }

    /// Whether update checks are disabled.
    #[must_use]
    pub const fn disable_checkpoint(&self) -> bool {
        self.disable_checkpoint
    }

    /// Whether anonymous signatures are omitted from update checks.
    #[must_use]
    pub const fn disable_checkpoint_signature(&self) -> bool {
        self.disable_checkpoint_signature
    }

    /// Ports plugin servers may listen on.
    #[must_use]
    pub const fn plugin_port_range(&self) -> RangeInclusive<u32> {
        self.plugin_min_port..=self.plugin_max_port
    }

    /// Explicitly configured builder plugins.
    #[must_use]
    pub const fn builders(&self) -> &BTreeMap<String, String> {
        &self.builders
    }

    /// Explicitly configured post-processor plugins.
    #[must_use]
    pub const fn post_processors(&self) -> &BTreeMap<String, String> {
        &self.post_processors
    }

    /// Explicitly configured provisioner plugins.
    #[must_use]
    pub const fn provisioners(&self) -> &BTreeMap<String, String> {
        &self.provisioners
    }
}
