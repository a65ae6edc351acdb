//! Behaviour-driven tests for layered plugin discovery.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use crate::catalog::BuiltinCatalog;
use crate::discovery::{PluginDiscovery, SearchContext};
use crate::error::DiscoveryError;
use crate::glob::SuffixPolicy;
use crate::internal::InternalPluginReference;
use crate::kind::PluginKind;
use crate::registry::PluginRegistry;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

struct TestWorld {
    exe_dir: TempDir,
    plugins_dir: TempDir,
    working_dir: TempDir,
    seed: PluginRegistry,
    catalog: BuiltinCatalog,
    inside_plugin: bool,
    result: Option<Result<PluginRegistry, DiscoveryError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld {
        exe_dir: TempDir::new().expect("exe dir"),
        plugins_dir: TempDir::new().expect("plugins dir"),
        working_dir: TempDir::new().expect("working dir"),
        seed: PluginRegistry::new(),
        catalog: BuiltinCatalog::new(),
        inside_plugin: false,
        result: None,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_kind(kind: &str) -> PluginKind {
    kind.parse().expect("known plugin kind")
}

fn location_dir<'a>(world: &'a TestWorld, location: &str) -> &'a Path {
    match location {
        "executable directory" => world.exe_dir.path(),
        "plugins directory" => world.plugins_dir.path(),
        "working directory" => world.working_dir.path(),
        other => panic!("unsupported location: '{other}'"),
    }
}

fn executable(world: &TestWorld) -> PathBuf {
    world.exe_dir.path().join("devo")
}

fn discovered(world: &TestWorld) -> &PluginRegistry {
    world
        .result
        .as_ref()
        .expect("discovery has not run")
        .as_ref()
        .expect("discovery failed")
}

fn resolved<'a>(world: &'a TestWorld, kind: &str, name: &str) -> &'a str {
    discovered(world)
        .get(parse_kind(kind), name.trim_matches('"'))
        .expect("plugin resolved")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a {kind} plugin {name} in the {location}")]
fn given_plugin_file(world: &mut TestWorld, kind: String, name: String, location: String) {
    let file_name = parse_kind(&kind).binary_name(name.trim_matches('"'));
    let path = location_dir(world, &location).join(file_name);
    fs::write(path, b"").expect("create plugin file");
}

#[given("a compiled-in {kind} {name}")]
fn given_builtin(world: &mut TestWorld, kind: String, name: String) {
    let catalog = std::mem::take(&mut world.catalog);
    world.catalog = catalog.with(parse_kind(&kind), name.trim_matches('"'));
}

#[given("a configured {kind} {name} at {path}")]
fn given_configured(world: &mut TestWorld, kind: String, name: String, path: String) {
    world.seed.insert(
        parse_kind(&kind),
        name.trim_matches('"'),
        path.trim_matches('"'),
    );
}

#[given("the process runs as a plugin child")]
fn given_inside_plugin(world: &mut TestWorld) {
    world.inside_plugin = true;
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("discovery runs")]
fn when_discovery_runs(world: &mut TestWorld) {
    let context = SearchContext::new(world.working_dir.path())
        .with_executable(executable(world))
        .with_plugins_dir(world.plugins_dir.path())
        .inside_plugin(world.inside_plugin);
    let result = PluginDiscovery::new(&world.catalog)
        .with_suffix_policy(SuffixPolicy::Any)
        .discover(world.seed.clone(), &context);
    world.result = Some(result);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("{kind} {name} resolves to the {location}")]
fn then_resolves_to_location(world: &mut TestWorld, kind: String, name: String, location: String) {
    let expected = location_dir(world, &location)
        .join(parse_kind(&kind).binary_name(name.trim_matches('"')));
    assert_eq!(
        resolved(world, &kind, &name),
        expected.to_string_lossy(),
        "unexpected path for {kind} {name}"
    );
}

#[then("{kind} {name} resolves to an internal reference")]
fn then_resolves_internally(world: &mut TestWorld, kind: String, name: String) {
    let value = resolved(world, &kind, &name);
    let reference = InternalPluginReference::parse(value).expect("internal reference");
    assert_eq!(reference.executable(), executable(world));
    assert_eq!(reference.kind(), parse_kind(&kind));
    assert_eq!(reference.name(), name.trim_matches('"'));
}

#[then("the registry is empty")]
fn then_registry_empty(world: &mut TestWorld) {
    assert!(discovered(world).is_empty());
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/plugin_discovery.feature")]
fn plugin_discovery_behaviour(world: TestWorld) {
    let _ = world;
}
