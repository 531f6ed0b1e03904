mod common;

use std::sync::Arc;

use common::{TEST_CONFIG, config_1_0_0, config_1_1_0, test_config_registry};
use jconf::{ConfigManager, Error, Settings, json::dumps};
use pretty_assertions::assert_eq;
use serde_json::json;

fn manager() -> ConfigManager {
    ConfigManager::new(Arc::new(test_config_registry()), Settings::default())
}

#[test]
fn test_new_config_1_0_0_has_empty_root() {
    let config = manager()
        .create_new_config(TEST_CONFIG, None, Some("1.0.0"))
        .unwrap();

    assert_eq!(config["@api"]["type"], TEST_CONFIG);
    assert_eq!(config["@api"]["version"], "1.0.0");
    assert!(config["@api"]["prev_version"].is_null());
    assert_eq!(config["root"], json!({}));
}

#[test]
fn test_new_config_1_0_1() {
    let config = manager()
        .create_new_config(TEST_CONFIG, None, Some("1.0.1"))
        .unwrap();

    assert_eq!(config["@api"]["version"], "1.0.1");
    assert_eq!(config["@api"]["prev_version"], "1.0.0");
    assert_eq!(config["root"], json!({}));
}

#[test]
fn test_new_config_defaults_to_latest() {
    let manager = manager();
    let config = manager.create_new_config(TEST_CONFIG, None, None).unwrap();

    assert_eq!(config["@api"]["version"], "1.1.0");
    assert_eq!(config["@api"]["prev_version"], "1.0.1");
    assert_eq!(config["root"], "001");
    assert_eq!(config["nodes"]["001"], json!({"id": "001"}));
    assert!(manager.validate_config(&config).is_ok());
}

#[test]
fn test_new_config_with_overrides() {
    let overrides = json!({
        "@config_id": "Foobar123",
        "root": "002",
        "nodes": {
            "002": {"id": "002", "content": ["002"]}
        }
    });
    let config = manager()
        .create_new_config(TEST_CONFIG, Some(&overrides), None)
        .unwrap();

    assert_eq!(config["@config_id"], "Foobar123");
    assert_eq!(config["@api"]["version"], "1.1.0");
    assert_eq!(config["root"], "002");
    assert_eq!(config["nodes"]["001"], json!({"id": "001"}));
    assert_eq!(config["nodes"]["002"]["content"], json!(["002"]));

    assert!(overrides.get("@api").is_none());
    assert!(overrides["nodes"].get("001").is_none());
}

#[test]
fn test_new_config_with_invalid_overrides() {
    let overrides = json!({"root": "not an id"});
    let err = manager()
        .create_new_config(TEST_CONFIG, Some(&overrides), None)
        .unwrap_err();

    match err {
        Error::InvalidConfig { config_type, version, error } => {
            assert_eq!(config_type, TEST_CONFIG);
            assert_eq!(version, "1.1.0");
            assert_eq!(error.pointer(), "/root");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_overrides_with_objects_in_arrays_are_refused_by_merge() {
    let overrides = json!({"root": "001"});
    let registry = test_config_registry();
    let mut schema = registry.schema(TEST_CONFIG, "1.1.0").unwrap().raw().clone();
    schema["properties"]["extra"] = json!({"type": "array", "default": [{"id": "001"}]});
    registry
        .register_schemas("Other", [("1.1.0", relabel(schema, "Other"))])
        .unwrap();

    let manager = ConfigManager::new(Arc::new(registry), Settings::default());
    let err = manager
        .create_new_config("Other", Some(&overrides), None)
        .unwrap_err();

    assert!(matches!(err, Error::Merge(_)));
}

fn relabel(mut schema: serde_json::Value, config_type: &str) -> serde_json::Value {
    let api_type = &mut schema["properties"]["@api"]["properties"]["type"];
    api_type["pattern"] = json!(format!("^{config_type}$"));
    api_type["default"] = json!(config_type);
    schema
}

#[test]
fn test_load_config_migrates_to_latest() {
    let manager = manager();
    let text = dumps(&config_1_0_0()).unwrap();
    let text = format!("// written by release 1\n{text}");

    let loaded = manager.load_config(&text, true).unwrap();
    assert_eq!(loaded, config_1_1_0());

    let as_stored = manager.load_config(&text, false).unwrap();
    assert_eq!(as_stored, config_1_0_0());
}

#[test]
fn test_load_config_rejects_unknown_version() {
    let mut document = config_1_1_0();
    document["@api"]["version"] = json!("1.2.3");
    let text = dumps(&document).unwrap();

    let err = manager().load_config(&text, false).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref error, .. } if error.message().contains("1.2.3")));

    let err = manager().load_config(&text, true).unwrap_err();
    assert!(matches!(err, Error::UnknownVersion { .. }));
}

#[test]
fn test_load_config_rejects_malformed_json() {
    let err = manager().load_config("{\"@api\": ", true).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_discovered_manager_serves_bundled_types() {
    let settings = Settings::builder()
        .include_types(vec!["WsgiServer".to_owned()])
        .build()
        .unwrap();
    let manager = ConfigManager::discover(settings).unwrap();

    assert_eq!(manager.registry().config_types(), ["WsgiServer"]);

    let config = manager
        .create_new_config("WsgiServer", Some(&json!({"server": {"address": "10.0.0.1"}})), None)
        .unwrap();
    assert_eq!(config["server"], json!({"address": "10.0.0.1", "port": 9000}));
    assert_eq!(config["@config_id"].as_str().map(str::len), Some(32));
}
