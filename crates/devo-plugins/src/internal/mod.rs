//! References to plugins compiled into the devo executable.
//!
//! A compiled-in plugin has no file of its own. The registry instead records
//! a string that names the devo executable, a marker segment and the plugin's
//! conventional binary name, joined by [`SENTINEL`]:
//!
//! ```text
//! /usr/local/bin/devo-DEVOSPACE-plugin-DEVOSPACE-packer-builder-docker
//! ```
//!
//! The launcher splits this string to re-run devo in plugin-serving mode.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DiscoveryError;
use crate::kind::PluginKind;

/// Separator between the segments of an internal plugin reference.
pub const SENTINEL: &str = "-DEVOSPACE-";

/// Middle segment marking the reference as an internal plugin.
const MARKER: &str = "plugin";

/// A compiled-in plugin served by re-running the devo executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalPluginReference {
    executable: PathBuf,
    kind: PluginKind,
    name: String,
}

impl InternalPluginReference {
    /// Creates a reference to the compiled-in plugin `name` of `kind`.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, kind: PluginKind, name: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            kind,
            name: name.into(),
        }
    }

    /// Path of the devo executable that serves the plugin.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Kind of the referenced plugin.
    #[must_use]
    pub const fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Logical plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry representation of this reference.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses a registry value produced by [`Self::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidReference`] when the value does not
    /// consist of an executable path, the `plugin` marker and a recognised
    /// plugin binary name.
    pub fn parse(reference: &str) -> Result<Self, DiscoveryError> {
        let invalid = || DiscoveryError::InvalidReference {
            reference: reference.to_owned(),
        };
        let parts: Vec<&str> = reference.split(SENTINEL).collect();
        let [executable, marker, binary] = parts.as_slice() else {
            return Err(invalid());
        };
        if executable.is_empty() || *marker != MARKER {
            return Err(invalid());
        }
        let (kind, name) = PluginKind::split_binary_name(binary).ok_or_else(invalid)?;
        Ok(Self::new(*executable, kind, name))
    }

    /// Returns `true` when a registry value is an internal reference rather
    /// than a path on disk.
    #[must_use]
    pub fn is_internal(value: &str) -> bool {
        Self::parse(value).is_ok()
    }
}

impl fmt::Display for InternalPluginReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{exe}{SENTINEL}{MARKER}{SENTINEL}{binary}",
            exe = self.executable.display(),
            binary = self.kind.binary_name(&self.name),
        )
    }
}
