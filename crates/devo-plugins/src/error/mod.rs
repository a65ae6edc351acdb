//! Domain errors raised while resolving plugin paths.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from plugin discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A search location could not be made absolute.
    #[error("failed to resolve plugin search directory '{path}': {source}")]
    ResolveDirectory {
        /// Directory as supplied to discovery.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Listing the entries that match a plugin pattern failed.
    #[error("failed to match plugin pattern '{pattern}': {source}")]
    Scan {
        /// Pattern being matched, for example `/opt/devo/packer-builder-*`.
        pattern: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The running executable could not be located, so internal plugins
    /// cannot be referenced.
    #[error("failed to locate the devo executable for internal plugins: {message}")]
    MissingExecutable {
        /// Description of the lookup failure.
        message: String,
    },

    /// A string did not follow the internal plugin reference encoding.
    #[error("'{reference}' is not an internal plugin reference")]
    InvalidReference {
        /// The rejected string.
        reference: String,
    },

    /// A plugin kind name was not recognised.
    #[error("unknown plugin kind '{kind}' (expected builder, post-processor or provisioner)")]
    UnknownKind {
        /// The rejected kind name.
        kind: String,
    },
}
