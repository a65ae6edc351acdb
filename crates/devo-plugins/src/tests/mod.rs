//! Crate-level integration and BDD tests.

use std::fs;

use tempfile::TempDir;

use crate::catalog::BuiltinCatalog;
use crate::discovery::{PluginDiscovery, SearchContext};
use crate::glob::SuffixPolicy;
use crate::internal::InternalPluginReference;
use crate::kind::PluginKind;
use crate::registry::PluginRegistry;

mod behaviour;

#[test]
fn end_to_end_discovery_with_standard_catalog() {
    let exe_dir = TempDir::new().expect("exe dir");
    let working_dir = TempDir::new().expect("working dir");
    let external = working_dir.path().join("packer-builder-docker");
    fs::write(&external, b"").expect("create plugin");

    let catalog = BuiltinCatalog::standard();
    let context = SearchContext::new(working_dir.path()).with_executable(exe_dir.path().join("devo"));
    let registry = PluginDiscovery::new(&catalog)
        .with_suffix_policy(SuffixPolicy::Any)
        .discover(PluginRegistry::new(), &context)
        .expect("discovery succeeds");

    assert_eq!(
        registry.get(PluginKind::Builder, "docker"),
        Some(external.to_string_lossy().as_ref())
    );
    for kind in PluginKind::ALL {
        for name in catalog.names(kind) {
            let value = registry.get(kind, name).expect("every built-in resolved");
            if kind == PluginKind::Builder && name == "docker" {
                continue;
            }
            assert!(
                InternalPluginReference::is_internal(value),
                "{kind} {name} should be internal, got {value}"
            );
        }
    }
}
