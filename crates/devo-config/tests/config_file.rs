//! Decoding behaviour of the user configuration file.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use devo_config::{Config, ConfigError, DEFAULT_PLUGIN_MAX_PORT, DEFAULT_PLUGIN_MIN_PORT};

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

#[test]
fn empty_object_keeps_defaults() {
    let config = Config::decode("{}".as_bytes()).expect("decode");
    assert_eq!(config, Config::default());
    assert_eq!(
        config.plugin_port_range(),
        DEFAULT_PLUGIN_MIN_PORT..=DEFAULT_PLUGIN_MAX_PORT
    );
    assert!(!config.disable_checkpoint());
}

#[test]
fn decodes_recognised_fields() {
    let document = r#"{
        "disable_checkpoint": true,
        "disable_checkpoint_signature": true,
        "PluginMinPort": 20000,
        "PluginMaxPort": 20010,
        "builders": { "custom": "/opt/devo/packer-builder-custom" },
        "post-processors": { "upload": "/opt/devo/packer-post-processor-upload" },
        "provisioners": { "ansible": "/opt/devo/packer-provisioner-ansible" }
    }"#;
    let config = Config::decode(document.as_bytes()).expect("decode");

    assert!(config.disable_checkpoint());
    assert!(config.disable_checkpoint_signature());
    assert_eq!(config.plugin_port_range(), 20_000..=20_010);
    assert_eq!(
        config.builders().get("custom").map(String::as_str),
        Some("/opt/devo/packer-builder-custom")
    );
    assert_eq!(
        config.post_processors().get("upload").map(String::as_str),
        Some("/opt/devo/packer-post-processor-upload")
    );
    assert_eq!(
        config.provisioners().get("ansible").map(String::as_str),
        Some("/opt/devo/packer-provisioner-ansible")
    );
}

#[test]
fn ignores_unknown_fields() {
    let config = Config::decode(r#"{"colour": "teal", "PluginMaxPort": 30000}"#.as_bytes())
        .expect("decode");
    assert_eq!(config.plugin_port_range(), DEFAULT_PLUGIN_MIN_PORT..=30_000);
}

#[test]
fn accepts_capitalised_plugin_maps() {
    let config = Config::decode(r#"{"Builders": {"a": "/a"}, "Provisioners": {"b": "/b"}}"#.as_bytes())
        .expect("decode");
    assert_eq!(config.builders().len(), 1);
    assert_eq!(config.provisioners().len(), 1);
}

#[rstest]
#[case::not_json("builders = 1")]
#[case::wrong_type(r#"{"PluginMinPort": "low"}"#)]
fn rejects_malformed_documents(#[case] document: &str) {
    let error = Config::decode(document.as_bytes()).expect_err("malformed document");
    assert!(matches!(error, ConfigError::Decode { .. }), "got {error}");
}

#[rstest]
#[case::both_explicit(r#"{"PluginMinPort": 9, "PluginMaxPort": 3}"#, 9, 3)]
#[case::max_below_default_min(r#"{"PluginMaxPort": 5000}"#, 10_000, 5_000)]
#[case::min_above_default_max(r#"{"PluginMinPort": 30000}"#, 30_000, 25_000)]
fn rejects_inverted_port_range(
    #[case] document: &str,
    #[case] expected_min: u32,
    #[case] expected_max: u32,
) {
    let error = Config::decode(document.as_bytes()).expect_err("inverted range");
    assert!(
        matches!(error, ConfigError::PortRange { min, max } if min == expected_min && max == expected_max),
        "got {error}"
    );
}

#[rstest]
fn missing_file_yields_defaults(temp_dir: TempDir) {
    let config =
        Config::load_from_path(&temp_dir.path().join("absent.json")).expect("defaults");
    assert_eq!(config, Config::default());
}

#[rstest]
fn loads_file_from_disk(temp_dir: TempDir) {
    let path = temp_dir.path().join("devo.json");
    fs::write(&path, r#"{"builders": {"local": "/usr/local/bin/packer-builder-local"}}"#)
        .expect("write config");
    let config = Config::load_from_path(&path).expect("load");
    assert!(config.builders().contains_key("local"));
}

#[rstest]
fn directory_in_place_of_file_is_an_error(temp_dir: TempDir) {
    let error = Config::load_from_path(temp_dir.path()).expect_err("directory is not a file");
    assert!(
        matches!(error, ConfigError::Read { .. } | ConfigError::Decode { .. }),
        "got {error}"
    );
}
