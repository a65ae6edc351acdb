//! Registry of resolved plugin paths.
//!
//! The [`PluginRegistry`] keeps one mapping per [`PluginKind`], keyed by the
//! logical plugin name. Entries are overwritten, never merged: the last
//! writer wins, which is how later search locations take precedence during
//! discovery. Each mapping is ordered by name.

use std::collections::BTreeMap;

use crate::kind::PluginKind;

/// Resolved plugin paths (or internal identifiers), one mapping per kind.
///
/// # Example
///
/// ```
/// use devo_plugins::{PluginKind, PluginRegistry};
///
/// let mut registry = PluginRegistry::new();
/// registry.insert(PluginKind::Builder, "docker", "/opt/packer-builder-docker");
/// let previous = registry.insert(PluginKind::Builder, "docker", "./packer-builder-docker");
/// assert_eq!(previous.as_deref(), Some("/opt/packer-builder-docker"));
/// assert_eq!(registry.get(PluginKind::Builder, "docker"), Some("./packer-builder-docker"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRegistry {
    builders: BTreeMap<String, String>,
    post_processors: BTreeMap<String, String>,
    provisioners: BTreeMap<String, String>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every `(name, path)` pair for `kind`, overwriting existing
    /// entries.
    pub fn seed<I, N, P>(&mut self, kind: PluginKind, entries: I)
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let map = self.map_mut(kind);
        for (name, path) in entries {
            map.insert(name.into(), path.into());
        }
    }

    /// Records `path` for `name`, returning the entry it replaced.
    pub fn insert(
        &mut self,
        kind: PluginKind,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Option<String> {
        self.map_mut(kind).insert(name.into(), path.into())
    }

    /// Looks up the resolved path for a plugin.
    #[must_use]
    pub fn get(&self, kind: PluginKind, name: &str) -> Option<&str> {
        self.map(kind).get(name).map(String::as_str)
    }

    /// Returns `true` when an entry exists for the plugin.
    #[must_use]
    pub fn contains(&self, kind: PluginKind, name: &str) -> bool {
        self.map(kind).contains_key(name)
    }

    /// Entries of one kind, sorted by name.
    #[must_use]
    pub fn entries(&self, kind: PluginKind) -> Vec<(&str, &str)> {
        self.map(kind)
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_str()))
            .collect()
    }

    /// Total number of entries across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len() + self.post_processors.len() + self.provisioners.len()
    }

    /// Returns `true` when no kind has any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    const fn map(&self, kind: PluginKind) -> &BTreeMap<String, String> {
        match kind {
            PluginKind::Builder => &self.builders,
            PluginKind::PostProcessor => &self.post_processors,
            PluginKind::Provisioner => &self.provisioners,
        }
    }

    const fn map_mut(&mut self, kind: PluginKind) -> &mut BTreeMap<String, String> {
        match kind {
            PluginKind::Builder => &mut self.builders,
            PluginKind::PostProcessor => &mut self.post_processors,
            PluginKind::Provisioner => &mut self.provisioners,
        }
    }
}
