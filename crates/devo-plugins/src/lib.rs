//! Plugin path resolution for devo.
//!
//! devo drives three kinds of external plugin executables: builders,
//! provisioners and post-processors. Each follows the naming convention
//! `<kind-prefix>-<name>[.ext]`, for example `packer-builder-docker`. This
//! crate turns that convention into a [`PluginRegistry`] mapping every
//! logical plugin name to the path (or internal identifier) the launcher
//! should run.
//!
//! # Precedence
//!
//! [`PluginDiscovery`] scans, in order, the directory of the running
//! executable, the per-user plugin directory and the current working
//! directory. Later scans overwrite earlier entries, so the effective
//! priority is the reverse of the search order:
//!
//! ```text
//! working dir  >  plugins dir  >  executable dir  >  configuration file
//! ```
//!
//! Compiled-in plugins listed in the [`BuiltinCatalog`] fill the remaining
//! gaps with an [`InternalPluginReference`] that points back at the devo
//! executable itself. They never replace an external entry.
//!
//! # Example
//!
//! ```rust,no_run
//! use devo_plugins::{BuiltinCatalog, PluginDiscovery, PluginKind, PluginRegistry, SearchContext};
//!
//! let catalog = BuiltinCatalog::standard();
//! let discovery = PluginDiscovery::new(&catalog);
//! let registry = discovery
//!     .discover(PluginRegistry::new(), &SearchContext::from_env())
//!     .expect("discovery succeeds");
//! assert!(registry.get(PluginKind::Builder, "docker").is_some());
//! ```

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod glob;
pub mod internal;
pub mod kind;
pub mod registry;

#[cfg(test)]
mod tests;

pub use self::catalog::BuiltinCatalog;
pub use self::discovery::{PluginDiscovery, SearchContext, SearchLocation};
pub use self::error::DiscoveryError;
pub use self::glob::{DiscoveredPlugin, PluginGlob, SuffixPolicy};
pub use self::internal::{InternalPluginReference, SENTINEL};
pub use self::kind::PluginKind;
pub use self::registry::PluginRegistry;
