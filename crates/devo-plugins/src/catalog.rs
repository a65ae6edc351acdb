//! Plugins compiled into the devo binary.

use crate::kind::PluginKind;

/// Names of the plugins devo implements itself, grouped by kind.
///
/// The catalogue is an explicit value handed to discovery rather than a
/// process-wide table, so tests can describe exactly which built-ins exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinCatalog {
    builders: Vec<String>,
    post_processors: Vec<String>,
    provisioners: Vec<String>,
}

impl BuiltinCatalog {
    /// An empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The plugins shipped with devo.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(PluginKind::Builder, "amazon-ebs")
            .with(PluginKind::Builder, "docker")
            .with(PluginKind::Builder, "null")
            .with(PluginKind::Builder, "virtualbox-iso")
            .with(PluginKind::PostProcessor, "checksum")
            .with(PluginKind::PostProcessor, "compress")
            .with(PluginKind::PostProcessor, "manifest")
            .with(PluginKind::Provisioner, "file")
            .with(PluginKind::Provisioner, "shell")
            .with(PluginKind::Provisioner, "shell-local")
    }

    /// Adds a compiled-in plugin.
    #[must_use]
    pub fn with(mut self, kind: PluginKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let names = self.names_mut(kind);
        if !names.contains(&name) {
            names.push(name);
        }
        self
    }

    /// Compiled-in plugin names of one kind.
    #[must_use]
    pub fn names(&self, kind: PluginKind) -> &[String] {
        match kind {
            PluginKind::Builder => &self.builders,
            PluginKind::PostProcessor => &self.post_processors,
            PluginKind::Provisioner => &self.provisioners,
        }
    }

    /// Returns `true` when `name` is compiled in for `kind`.
    #[must_use]
    pub fn contains(&self, kind: PluginKind, name: &str) -> bool {
        self.names(kind).iter().any(|candidate| candidate == name)
    }

    const fn names_mut(&mut self, kind: PluginKind) -> &mut Vec<String> {
        match kind {
            PluginKind::Builder => &mut self.builders,
            PluginKind::PostProcessor => &mut self.post_processors,
            PluginKind::Provisioner => &mut self.provisioners,
        }
    }
}
