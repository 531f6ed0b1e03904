#![allow(dead_code)]

use jconf::{BoxError, Document, Registry, migration_fn};
use serde_json::{Map, Value, json};

pub const TEST_CONFIG: &str = "TestConfig";

pub const SCHEMA_1_0_0: &str = include_str!("../fixtures/test_config/schema_1_0_0.json");
pub const SCHEMA_1_0_1: &str = include_str!("../fixtures/test_config/schema_1_0_1.json");
pub const SCHEMA_1_1_0: &str = include_str!("../fixtures/test_config/schema_1_1_0.json");

pub fn schemas() -> Vec<(&'static str, Value)> {
    [("1.0.0", SCHEMA_1_0_0), ("1.0.1", SCHEMA_1_0_1), ("1.1.0", SCHEMA_1_1_0)]
        .into_iter()
        .map(|(version, text)| (version, serde_json::from_str(text).unwrap()))
        .collect()
}

/// `TestConfig` with all three versions and both migrations.
pub fn test_config_registry() -> Registry {
    let registry = Registry::new();
    registry
        .register(
            TEST_CONFIG,
            schemas(),
            [
                ("1.0.0-1.0.1", migration_fn(rename_child_nodes)),
                ("1.0.1-1.1.0", migration_fn(flatten_nodes)),
            ],
        )
        .unwrap();
    registry
}

fn set_api(document: &mut Document, version: &str, prev_version: &str) {
    document["@api"]["version"] = json!(version);
    document["@api"]["prev_version"] = json!(prev_version);
}

/// 1.0.0 -> 1.0.1: `child_nodes` becomes `content` throughout the tree.
pub fn rename_child_nodes(mut document: Document) -> Result<Document, BoxError> {
    fn rename(node: &mut Value) {
        let Some(node) = node.as_object_mut() else {
            return;
        };
        if let Some(mut children) = node.remove("child_nodes") {
            for child in children.as_array_mut().into_iter().flatten() {
                rename(child);
            }
            node.insert("content".to_owned(), children);
        }
    }

    set_api(&mut document, "1.0.1", "1.0.0");
    rename(&mut document["root"]);
    Ok(document)
}

/// 1.0.1 -> 1.1.0: the tree becomes a flat `nodes` map and `root` its id.
pub fn flatten_nodes(mut document: Document) -> Result<Document, BoxError> {
    fn collect(mut node: Value, nodes: &mut Map<String, Value>) -> Result<String, BoxError> {
        let id = node["id"].as_str().ok_or("node without id")?.to_owned();
        let children = node.as_object_mut().and_then(|node| node.remove("content"));

        if let Some(Value::Array(children)) = children {
            let ids = children
                .into_iter()
                .map(|child| collect(child, nodes))
                .collect::<Result<Vec<_>, _>>()?;
            node["content"] = json!(ids);
        }

        nodes.insert(id.clone(), node);
        Ok(id)
    }

    set_api(&mut document, "1.1.0", "1.0.1");
    let mut nodes = Map::new();
    let root = collect(document["root"].take(), &mut nodes)?;
    document["root"] = json!(root);
    document["nodes"] = Value::Object(nodes);
    Ok(document)
}

pub fn config_1_0_0() -> Document {
    json!({
        "@api": {"type": "TestConfig", "version": "1.0.0", "prev_version": null},
        "@config_id": "testing",
        "root": {
            "id": "001",
            "child_nodes": [
                {"id": "002", "child_nodes": [{"id": "003"}]},
                {
                    "id": "004",
                    "child_nodes": [{
                        "id": "005",
                        "child_nodes": [
                            {"id": "006", "child_nodes": [{"id": "007"}]},
                            {"id": "008"}
                        ]
                    }]
                }
            ]
        }
    })
}

pub fn config_1_0_1() -> Document {
    json!({
        "@api": {"type": "TestConfig", "version": "1.0.1", "prev_version": "1.0.0"},
        "@config_id": "testing",
        "root": {
            "id": "001",
            "content": [
                {"id": "002", "content": [{"id": "003"}]},
                {
                    "id": "004",
                    "content": [{
                        "id": "005",
                        "content": [
                            {"id": "006", "content": [{"id": "007"}]},
                            {"id": "008"}
                        ]
                    }]
                }
            ]
        }
    })
}

pub fn config_1_1_0() -> Document {
    json!({
        "@api": {"type": "TestConfig", "version": "1.1.0", "prev_version": "1.0.1"},
        "@config_id": "testing",
        "root": "001",
        "nodes": {
            "001": {"id": "001", "content": ["002", "004"]},
            "002": {"id": "002", "content": ["003"]},
            "003": {"id": "003"},
            "004": {"id": "004", "content": ["005"]},
            "005": {"id": "005", "content": ["006", "008"]},
            "006": {"id": "006", "content": ["007"]},
            "007": {"id": "007"},
            "008": {"id": "008"}
        }
    })
}
