//! Layered plugin discovery.
//!
//! [`PluginDiscovery`] walks the [`SearchLocation`]s in a fixed order and lets
//! every match overwrite what earlier locations (or the configuration file
//! seed) recorded. Once every location has been scanned, compiled-in plugins
//! that are still unresolved are filled with an [`InternalPluginReference`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::BuiltinCatalog;
use crate::error::DiscoveryError;
use crate::glob::{PluginGlob, SuffixPolicy};
use crate::internal::InternalPluginReference;
use crate::kind::PluginKind;
use crate::registry::PluginRegistry;

const DISCOVERY_TARGET: &str = "devo_plugins::discovery";

/// Directories searched for plugin executables, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLocation {
    /// Directory containing the running devo executable.
    ExecutableDir,
    /// The per-user plugin directory.
    PluginsDir,
    /// The current working directory.
    WorkingDir,
}

impl SearchLocation {
    /// Every location, in scan order. Later locations take precedence.
    pub const ORDER: [Self; 3] = [Self::ExecutableDir, Self::PluginsDir, Self::WorkingDir];

    /// Short label used in logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExecutableDir => "executable dir",
            Self::PluginsDir => "plugins dir",
            Self::WorkingDir => "working dir",
        }
    }
}

/// Process facts discovery depends on.
///
/// Production code builds this with [`SearchContext::from_env`]; tests set
/// every field explicitly so no global state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    executable: Option<PathBuf>,
    plugins_dir: Option<PathBuf>,
    working_dir: PathBuf,
    inside_plugin: bool,
}

impl SearchContext {
    /// A context with only a working directory.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: None,
            plugins_dir: None,
            working_dir: working_dir.into(),
            inside_plugin: false,
        }
    }

    /// Reads the running executable, the plugin directory and the plugin
    /// cookie from the process environment.
    ///
    /// A lookup that fails is logged and the matching location is skipped.
    #[must_use]
    pub fn from_env() -> Self {
        let executable = std::env::current_exe()
            .inspect_err(|error| {
                warn!(
                    target: DISCOVERY_TARGET,
                    error = %error,
                    "cannot locate the devo executable"
                );
            })
            .ok();
        let plugins_dir = devo_config::plugins_dir()
            .inspect_err(|error| {
                warn!(
                    target: DISCOVERY_TARGET,
                    error = %error,
                    "cannot locate the plugin directory"
                );
            })
            .ok();

        Self {
            executable,
            plugins_dir,
            working_dir: PathBuf::from("."),
            inside_plugin: devo_config::env::inside_plugin(),
        }
    }

    /// Sets the path of the running executable.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// Sets the per-user plugin directory.
    #[must_use]
    pub fn with_plugins_dir(mut self, plugins_dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = Some(plugins_dir.into());
        self
    }

    /// Marks the process as a plugin's own child.
    #[must_use]
    pub const fn inside_plugin(mut self, inside_plugin: bool) -> Self {
        self.inside_plugin = inside_plugin;
        self
    }

    /// Path of the running executable, when known.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// Directory searched for `location`, when known.
    #[must_use]
    pub fn directory(&self, location: SearchLocation) -> Option<&Path> {
        match location {
            SearchLocation::ExecutableDir => self.executable.as_deref().and_then(Path::parent),
            SearchLocation::PluginsDir => self.plugins_dir.as_deref(),
            SearchLocation::WorkingDir => Some(&self.working_dir),
        }
    }
}

/// Resolves plugin names to executables.
///
/// # Example
///
/// ```
/// use devo_plugins::{BuiltinCatalog, PluginDiscovery, PluginKind, PluginRegistry, SearchContext};
///
/// let catalog = BuiltinCatalog::new().with(PluginKind::Builder, "null");
/// let context = SearchContext::new(std::env::temp_dir().join("devo-no-plugins-here"))
///     .with_executable("/opt/devo/bin/devo");
/// let registry = PluginDiscovery::new(&catalog)
///     .discover(PluginRegistry::new(), &context)
///     .expect("discovery succeeds");
/// assert_eq!(
///     registry.get(PluginKind::Builder, "null"),
///     Some("/opt/devo/bin/devo-DEVOSPACE-plugin-DEVOSPACE-packer-builder-null"),
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PluginDiscovery<'a> {
    catalog: &'a BuiltinCatalog,
    suffix: SuffixPolicy,
}

impl<'a> PluginDiscovery<'a> {
    /// Creates a discovery pass filling gaps from `catalog`.
    #[must_use]
    pub fn new(catalog: &'a BuiltinCatalog) -> Self {
        Self {
            catalog,
            suffix: SuffixPolicy::native(),
        }
    }

    /// Overrides the platform suffix policy.
    #[must_use]
    pub const fn with_suffix_policy(mut self, suffix: SuffixPolicy) -> Self {
        self.suffix = suffix;
        self
    }

    /// Scans every search location and fills compiled-in plugins.
    ///
    /// `registry` is the seed, typically the configuration file mappings. It
    /// is returned untouched when the process is a plugin's own child.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ResolveDirectory`] or
    /// [`DiscoveryError::Scan`] when a location cannot be resolved or listed,
    /// and [`DiscoveryError::MissingExecutable`] when a compiled-in plugin
    /// needs a reference but the executable path is unknown. Discovery stops
    /// at the first error.
    pub fn discover(
        &self,
        mut registry: PluginRegistry,
        context: &SearchContext,
    ) -> Result<PluginRegistry, DiscoveryError> {
        if context.inside_plugin {
            debug!(
                target: DISCOVERY_TARGET,
                "running as a plugin child; skipping discovery"
            );
            return Ok(registry);
        }

        for location in SearchLocation::ORDER {
            let Some(dir) = context.directory(location) else {
                debug!(
                    target: DISCOVERY_TARGET,
                    location = location.label(),
                    "search location unavailable; skipping"
                );
                continue;
            };
            let dir = absolutise(dir)?;
            self.scan_location(&mut registry, location, &dir)?;
        }

        self.fill_internal(&mut registry, context)?;
        Ok(registry)
    }

    fn scan_location(
        &self,
        registry: &mut PluginRegistry,
        location: SearchLocation,
        dir: &Path,
    ) -> Result<(), DiscoveryError> {
        for kind in PluginKind::ALL {
            let glob = PluginGlob::new(kind, self.suffix);
            for plugin in glob.scan(dir)? {
                let (name, path) = plugin.into_parts();
                let Some(path) = path.to_str().map(str::to_owned) else {
                    debug!(
                        target: DISCOVERY_TARGET,
                        location = location.label(),
                        path = %path.display(),
                        "ignoring plugin with a non UTF-8 path"
                    );
                    continue;
                };
                debug!(
                    target: DISCOVERY_TARGET,
                    location = location.label(),
                    kind = kind.as_str(),
                    name = %name,
                    path = %path,
                    "discovered plugin"
                );
                if let Some(previous) = registry.insert(kind, name, path) {
                    debug!(
                        target: DISCOVERY_TARGET,
                        previous = %previous,
                        "overrode earlier plugin entry"
                    );
                }
            }
        }
        Ok(())
    }

    fn fill_internal(
        &self,
        registry: &mut PluginRegistry,
        context: &SearchContext,
    ) -> Result<(), DiscoveryError> {
        for kind in PluginKind::ALL {
            for name in self.catalog.names(kind) {
                if registry.contains(kind, name) {
                    continue;
                }
                let executable =
                    context
                        .executable()
                        .ok_or_else(|| DiscoveryError::MissingExecutable {
                            message: format!(
                                "needed for internal {kind} '{name}' but the executable path is unknown"
                            ),
                        })?;
                let reference = InternalPluginReference::new(executable, kind, name.as_str());
                debug!(
                    target: DISCOVERY_TARGET,
                    kind = kind.as_str(),
                    name = %name,
                    "using internal plugin"
                );
                registry.insert(kind, name.as_str(), reference.encode());
            }
        }
        Ok(())
    }
}

fn absolutise(dir: &Path) -> Result<PathBuf, DiscoveryError> {
    std::path::absolute(dir).map_err(|source| DiscoveryError::ResolveDirectory {
        path: dir.to_path_buf(),
        source: Arc::new(source),
    })
}
