//! Unit tests for plugin directory matching.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"#!/bin/sh\n").expect("create plugin file");
}

#[fixture]
fn plugin_dir() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for name in [
        "packer-builder-foo.txt",
        "packer-builder-foo.exe",
        "packer-builder-bar",
        "packer-builder-.exe",
        "packer-builderbaz",
        "packer-provisioner-shell",
        "README.md",
    ] {
        touch(dir.path(), name);
    }
    dir
}

fn names(matches: &[DiscoveredPlugin]) -> Vec<&str> {
    matches.iter().map(DiscoveredPlugin::name).collect()
}

#[rstest]
#[case::plain("packer-builder-foo.exe", true)]
#[case::upper("PACKER-BUILDER-FOO.EXE", true)]
#[case::mixed("packer-builder-foo.Exe", true)]
#[case::text("packer-builder-foo.txt", false)]
#[case::bare("packer-builder-foo", false)]
#[case::exe_not_last("packer-builder-foo.exe.bak", false)]
fn require_exe_checks_last_extension(#[case] file_name: &str, #[case] accepted: bool) {
    assert_eq!(SuffixPolicy::RequireExe.accepts(file_name), accepted);
    assert!(SuffixPolicy::Any.accepts(file_name));
}

#[rstest]
fn require_exe_ignores_other_extensions(plugin_dir: TempDir) {
    let glob = PluginGlob::new(PluginKind::Builder, SuffixPolicy::RequireExe);
    let matches = glob.scan(plugin_dir.path()).expect("scan succeeds");
    assert_eq!(names(&matches), vec!["foo"]);
    let first = matches.first().expect("one match");
    assert_eq!(first.path(), plugin_dir.path().join("packer-builder-foo.exe"));
}

#[rstest]
fn any_suffix_truncates_at_first_dot(plugin_dir: TempDir) {
    let glob = PluginGlob::new(PluginKind::Builder, SuffixPolicy::Any);
    let matches = glob.scan(plugin_dir.path()).expect("scan succeeds");
    // Sorted by file name; both foo files collapse to the same name and the
    // later one (foo.txt) wins once inserted into a registry.
    assert_eq!(names(&matches), vec!["bar", "foo", "foo"]);
    let last = matches.last().expect("matches present");
    assert_eq!(last.path(), plugin_dir.path().join("packer-builder-foo.txt"));
}

#[rstest]
fn scan_is_limited_to_one_kind(plugin_dir: TempDir) {
    let glob = PluginGlob::new(PluginKind::Provisioner, SuffixPolicy::Any);
    let matches = glob.scan(plugin_dir.path()).expect("scan succeeds");
    assert_eq!(names(&matches), vec!["shell"]);
    assert_eq!(glob.kind(), PluginKind::Provisioner);
}

#[test]
fn missing_directory_yields_no_matches() {
    let dir = TempDir::new().expect("create temp dir");
    let glob = PluginGlob::new(PluginKind::Builder, SuffixPolicy::Any);
    let matches = glob
        .scan(&dir.path().join("does-not-exist"))
        .expect("missing directory is not an error");
    assert!(matches.is_empty());
}

#[test]
fn file_in_place_of_directory_yields_no_matches() {
    let dir = TempDir::new().expect("create temp dir");
    touch(dir.path(), "plain-file");
    let glob = PluginGlob::new(PluginKind::Builder, SuffixPolicy::Any);
    let matches = glob
        .scan(&dir.path().join("plain-file"))
        .expect("non-directory is not an error");
    assert!(matches.is_empty());
}

#[test]
fn pattern_names_directory_and_prefix() {
    let glob = PluginGlob::new(PluginKind::PostProcessor, SuffixPolicy::Any);
    let pattern = glob.pattern(Path::new("/opt/devo"));
    assert_eq!(
        pattern,
        Path::new("/opt/devo")
            .join("packer-post-processor-*")
            .display()
            .to_string()
    );
}

#[test]
fn into_parts_returns_name_and_path() {
    let dir = TempDir::new().expect("create temp dir");
    touch(dir.path(), "packer-post-processor-manifest");
    let glob = PluginGlob::new(PluginKind::PostProcessor, SuffixPolicy::Any);
    let mut matches = glob.scan(dir.path()).expect("scan succeeds");
    let (name, path) = matches.pop().expect("one match").into_parts();
    assert_eq!(name, "manifest");
    assert_eq!(path, dir.path().join("packer-post-processor-manifest"));
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new().expect("create temp dir");
    fs::write(dir.path().join(OsStr::from_bytes(b"packer-builder-caf\xE9")), b"")
        .expect("create non UTF-8 plugin file");
    touch(dir.path(), "packer-builder-cafe");

    let glob = PluginGlob::new(PluginKind::Builder, SuffixPolicy::Any);
    let matches = glob.scan(dir.path()).expect("scan succeeds");

    assert_eq!(names(&matches), vec!["cafe"]);
    assert!(matches.iter().all(|plugin| plugin.path().exists()));
}
