//! Matching plugin executables in a single directory.
//!
//! A [`PluginGlob`] is the equivalent of the shell pattern
//! `<dir>/<kind-prefix>-*`. Each match is reduced to a logical plugin name by
//! truncating the file name at its first `.` and stripping the kind prefix,
//! so `packer-builder-docker.exe` yields `docker`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::DiscoveryError;
use crate::kind::PluginKind;

const GLOB_TARGET: &str = "devo_plugins::glob";

/// File name requirement applied to matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixPolicy {
    /// Every matching entry is accepted.
    Any,
    /// Only entries whose last extension is `exe` (any case) are accepted.
    RequireExe,
}

impl SuffixPolicy {
    /// Policy for the platform devo was compiled for.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            Self::RequireExe
        } else {
            Self::Any
        }
    }

    /// Returns `true` when `file_name` satisfies the policy.
    #[must_use]
    pub fn accepts(self, file_name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::RequireExe => Path::new(file_name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("exe")),
        }
    }
}

impl Default for SuffixPolicy {
    fn default() -> Self {
        Self::native()
    }
}

/// A plugin executable found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPlugin {
    name: String,
    path: PathBuf,
}

impl DiscoveredPlugin {
    /// Logical plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the match, returning the name and path.
    #[must_use]
    pub fn into_parts(self) -> (String, PathBuf) {
        (self.name, self.path)
    }
}

/// Directory matcher for one plugin kind.
#[derive(Debug, Clone, Copy)]
pub struct PluginGlob {
    kind: PluginKind,
    suffix: SuffixPolicy,
}

impl PluginGlob {
    /// Creates a matcher for `kind` applying `suffix` to every match.
    #[must_use]
    pub const fn new(kind: PluginKind, suffix: SuffixPolicy) -> Self {
        Self { kind, suffix }
    }

    /// Kind this matcher looks for.
    #[must_use]
    pub const fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Human-readable pattern, used in logs and errors.
    #[must_use]
    pub fn pattern(&self, dir: &Path) -> String {
        dir.join(format!("{}-*", self.kind.prefix()))
            .display()
            .to_string()
    }

    /// Lists the plugins of this kind in `dir`, sorted by file name.
    ///
    /// A missing directory yields no matches, as does one devo may not read.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Scan`] when listing the directory fails for
    /// any other reason.
    pub fn scan(&self, dir: &Path) -> Result<Vec<DiscoveredPlugin>, DiscoveryError> {
        let scan_error = |source: io::Error| DiscoveryError::Scan {
            pattern: self.pattern(dir),
            source: source.into(),
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) if is_absent(&error) => return Ok(Vec::new()),
            Err(error) if error.kind() == io::ErrorKind::PermissionDenied => {
                warn!(
                    target: GLOB_TARGET,
                    directory = %dir.display(),
                    "skipping unreadable plugin directory"
                );
                return Ok(Vec::new());
            }
            Err(error) => return Err(scan_error(error)),
        };

        let mut file_names = Vec::new();
        for entry in entries {
            let raw_name = entry.map_err(scan_error)?.file_name();
            let Some(file_name) = raw_name.to_str() else {
                if raw_name.to_string_lossy().starts_with(self.kind.prefix()) {
                    debug!(
                        target: GLOB_TARGET,
                        file = %raw_name.display(),
                        "ignoring plugin match with a non UTF-8 name"
                    );
                }
                continue;
            };
            if file_name
                .strip_prefix(self.kind.prefix())
                .is_some_and(|rest| rest.starts_with('-'))
            {
                file_names.push(file_name.to_owned());
            }
        }
        file_names.sort_unstable();

        Ok(file_names
            .into_iter()
            .filter_map(|file_name| self.to_plugin(dir, file_name))
            .collect())
    }

    fn to_plugin(&self, dir: &Path, file_name: String) -> Option<DiscoveredPlugin> {
        if !self.suffix.accepts(&file_name) {
            debug!(
                target: GLOB_TARGET,
                file = %file_name,
                "ignoring plugin match without .exe extension"
            );
            return None;
        }

        let stem = file_name.split('.').next().unwrap_or_default();
        let name = stem
            .strip_prefix(self.kind.prefix())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or_default();
        if name.is_empty() {
            debug!(
                target: GLOB_TARGET,
                file = %file_name,
                "ignoring plugin match without a name"
            );
            return None;
        }

        Some(DiscoveredPlugin {
            name: name.to_owned(),
            path: dir.join(&file_name),
        })
    }
}

fn is_absent(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests;
