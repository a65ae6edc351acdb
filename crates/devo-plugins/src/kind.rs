//! Plugin categories and their file naming convention.

use std::fmt;
use std::str::FromStr;

use crate::error::DiscoveryError;

/// Category of external plugin devo can invoke.
///
/// # Example
///
/// ```
/// use devo_plugins::PluginKind;
///
/// assert_eq!(PluginKind::PostProcessor.prefix(), "packer-post-processor");
/// assert_eq!(PluginKind::PostProcessor.as_str(), "post-processor");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginKind {
    /// Produces machine images.
    Builder,
    /// Transforms build artefacts after a build completes.
    PostProcessor,
    /// Configures a machine while it is being built.
    Provisioner,
}

impl PluginKind {
    /// Every kind, in the order discovery scans them.
    pub const ALL: [Self; 3] = [Self::Builder, Self::PostProcessor, Self::Provisioner];

    /// Canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::PostProcessor => "post-processor",
            Self::Provisioner => "provisioner",
        }
    }

    /// File name prefix shared by every executable of this kind, without the
    /// trailing `-` that separates it from the logical name.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Builder => "packer-builder",
            Self::PostProcessor => "packer-post-processor",
            Self::Provisioner => "packer-provisioner",
        }
    }

    /// Executable stem for the logical plugin `name`.
    #[must_use]
    pub fn binary_name(self, name: &str) -> String {
        format!("{}-{name}", self.prefix())
    }

    /// Recovers the kind and logical name from an executable stem such as
    /// `packer-provisioner-shell`.
    #[must_use]
    pub fn split_binary_name(stem: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|kind| {
            stem.strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_prefix('-'))
                .filter(|name| !name.is_empty())
                .map(|name| (kind, name))
        })
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginKind {
    type Err = DiscoveryError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| DiscoveryError::UnknownKind {
                kind: input.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("packer-builder-docker", PluginKind::Builder, "docker")]
    #[case("packer-post-processor-manifest", PluginKind::PostProcessor, "manifest")]
    #[case("packer-provisioner-shell-local", PluginKind::Provisioner, "shell-local")]
    fn splits_binary_names(#[case] stem: &str, #[case] kind: PluginKind, #[case] name: &str) {
        assert_eq!(PluginKind::split_binary_name(stem), Some((kind, name)));
        assert_eq!(kind.binary_name(name), stem);
    }

    #[rstest]
    #[case::bare_prefix("packer-builder-")]
    #[case::missing_separator("packer-builderdocker")]
    #[case::foreign("terraform-provider-aws")]
    fn rejects_foreign_stems(#[case] stem: &str) {
        assert_eq!(PluginKind::split_binary_name(stem), None);
    }

    #[rstest]
    #[case("builder", PluginKind::Builder)]
    #[case("Post-Processor", PluginKind::PostProcessor)]
    #[case(" provisioner ", PluginKind::Provisioner)]
    fn parses_kind_names(#[case] input: &str, #[case] expected: PluginKind) {
        assert_eq!(input.parse::<PluginKind>().expect("known kind"), expected);
    }

    #[test]
    fn rejects_unknown_kind_names() {
        let error = "compiler".parse::<PluginKind>().expect_err("unknown kind");
        assert!(error.to_string().contains("compiler"));
    }
}
