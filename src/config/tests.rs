#![cfg(test)]

use crate::config::config::{ConfigError, EndpointsFile};
use crate::config::{Cli, Config, LoggingConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Parse a JSON string into an `EndpointsFile` and run validation.
fn load_json(json: &str) -> Result<EndpointsFile, ConfigError> {
    let file: EndpointsFile = serde_json::from_str(json).expect("JSON parse error");
    file.validate()?;
    Ok(file)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn test_basic_config() {
    let json = r#"
    {
        "endpoints": [
            {
                "path": "/trending-feed",
                "json_file": "trending.json",
                "proto_file": "/abs/path/file.proto",
                "message_type": "FeedFetchResponse",
                "proto_root": "/abs/path/protoroot"
            }
        ]
    }"#;

    let file = load_json(json).expect("valid config");
    assert_eq!(file.endpoints.len(), 1);
    assert_eq!(file.endpoints[0].path, "/trending-feed");
    assert_eq!(file.endpoints[0].proto_root.as_deref(), Some("/abs/path/protoroot"));
    assert_eq!(file.logging, LoggingConfig::default());
}

#[test]
fn test_proto_root_is_optional() {
    let json = r#"{ "endpoints": [
        { "path": "/a", "json_file": "a.json", "proto_file": "a.proto", "message_type": "A" }
    ] }"#;

    let file = load_json(json).expect("valid config");
    assert_eq!(file.endpoints[0].proto_root, None);
}

#[test]
fn test_missing_field_fails() {
    let json = r#"{ "endpoints": [
        { "path": "/a", "json_file": "a.json", "proto_file": "a.proto", "message_type": "A" },
        { "path": "/b", "json_file": "b.json", "message_type": "B" }
    ] }"#;

    let result = load_json(json);
    assert!(matches!(
        result,
        Err(ConfigError::MissingField { index: 1, field: "proto_file" })
    ));
}

#[test]
fn test_blank_field_counts_as_missing() {
    let json = r#"{ "endpoints": [
        { "path": "/a", "json_file": "a.json", "proto_file": "a.proto", "message_type": "  " }
    ] }"#;

    assert!(matches!(
        load_json(json),
        Err(ConfigError::MissingField { index: 0, field: "message_type" })
    ));
}

#[test]
fn test_duplicate_path_fails() {
    let json = r#"{ "endpoints": [
        { "path": "/a", "json_file": "a.json", "proto_file": "a.proto", "message_type": "A" },
        { "path": "/a", "json_file": "b.json", "proto_file": "b.proto", "message_type": "B" }
    ] }"#;

    assert!(matches!(load_json(json), Err(ConfigError::DuplicatePath(p)) if p == "/a"));
}

#[test]
fn test_path_without_leading_slash_fails() {
    let json = r#"{ "endpoints": [
        { "path": "getProfile", "json_file": "a.json", "proto_file": "a.proto", "message_type": "A" }
    ] }"#;

    assert!(matches!(load_json(json), Err(ConfigError::InvalidPath { index: 0, .. })));
}

#[test]
fn test_empty_endpoints_is_valid() {
    let file = load_json("{}").expect("valid config");
    assert!(file.endpoints.is_empty());
}

#[test]
fn test_toml_and_json_are_equivalent() {
    let dir = TempDir::new().unwrap();
    let json_path = write(
        dir.path(),
        "endpoints.json",
        r#"{ "endpoints": [
            { "path": "/a", "json_file": "a.json", "proto_file": "a.proto", "message_type": "A" }
        ], "logging": { "log_to_file": true } }"#,
    );
    let toml_path = write(
        dir.path(),
        "endpoints.toml",
        r#"
        [logging]
        log_to_file = true

        [[endpoints]]
        path = "/a"
        json_file = "a.json"
        proto_file = "a.proto"
        message_type = "A"
        "#,
    );

    let from_json = EndpointsFile::from_path(&json_path).expect("json config");
    let from_toml = EndpointsFile::from_path(&toml_path).expect("toml config");
    assert_eq!(from_json.endpoints, from_toml.endpoints);
    assert_eq!(from_json.logging, from_toml.logging);
    assert_eq!(from_toml.logging.log_file_path, "protomock.log");
}

#[test]
fn test_malformed_files_fail() {
    let dir = TempDir::new().unwrap();
    let bad_json = write(dir.path(), "bad.json", "{ \"endpoints\": [ ");
    let bad_toml = write(dir.path(), "bad.toml", "[[endpoints]\npath = ");

    assert!(matches!(EndpointsFile::from_path(&bad_json), Err(ConfigError::Json { .. })));
    assert!(matches!(EndpointsFile::from_path(&bad_toml), Err(ConfigError::Toml { .. })));
    assert!(matches!(
        EndpointsFile::from_path(&dir.path().join("absent.json")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_config_from_cli_resolves_relative_paths() {
    let dir = TempDir::new().unwrap();
    let config_path = write(
        dir.path(),
        "endpoints.json",
        r#"{ "endpoints": [
            { "path": "/a", "json_file": "fixtures/a.json", "proto_file": "protos/a.proto",
              "message_type": "A", "proto_root": "protos" }
        ] }"#,
    );

    let mut cli = Cli::new(&config_path);
    cli.port = 9090;
    cli.no_schema_cache = true;
    let config = Config::from_cli(&cli).expect("config loads");

    assert_eq!(config.server.bind_address(), "localhost:9090");
    assert!(!config.server.cache_schemas);
    let endpoint = config.registry.lookup("/a").expect("registered");
    assert_eq!(endpoint.json_file, dir.path().join("fixtures/a.json"));
    assert_eq!(endpoint.proto_root, Some(dir.path().join("protos")));
}
