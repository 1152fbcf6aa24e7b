//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! Filesystem access is limited to temporary directories.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::fs;

use tempfile::TempDir;

use crate::BridgeError;
use crate::config::{Config, LogLevel};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert!(!config.general.log_to_file);
    assert_eq!(config.session.bus_name, "media_session_bridge");
    assert!(config.session.artwork.enabled);
    assert!(config.session.artwork.timeout_secs.is_none());
}

#[test]
fn config_serialize_toml() {
    let config = Config::default();

    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[session]"));
    assert!(toml_str.contains("[session.artwork]"));
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [session]
        identity = "My Player"

        [session.artwork]
        enabled = false
        timeout_secs = 5
    "#;

    let config = Config::from_toml(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.session.identity, "My Player");
    assert_eq!(config.session.bus_name, "media_session_bridge");
    assert!(!config.session.artwork.enabled);
    assert_eq!(config.session.artwork.timeout_secs, Some(5));
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_invalid_toml() {
    let result = Config::from_toml("[general]\nlog_level = 42");

    assert!(matches!(result, Err(BridgeError::TomlParseError { .. })));
}

#[test]
fn log_level_display() {
    assert_eq!(LogLevel::Error.to_string(), "error");
    assert_eq!(LogLevel::Trace.to_string(), "trace");
}

#[test]
fn load_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();

    let config = Config::load(&temp.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn load_reports_file_location_on_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[session\n").unwrap();

    let err = Config::load(&path).unwrap_err();

    match err {
        BridgeError::TomlParseError { location, .. } => {
            assert!(location.ends_with("config.toml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[session]\nbus_name = \"demo\"\n").unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.session.bus_name, "demo");
}
