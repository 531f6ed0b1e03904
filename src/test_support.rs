use serde_json::{Value, json};

use crate::{
    migration::migration_fn,
    registry::Registry,
};

fn exact(value: &str) -> String {
    format!("^{}$", value.replace('.', "\\."))
}

/// A minimal `Sample` schema requiring a non-empty `name`.
pub(crate) fn schema_json(version: &str, prev: Option<&str>) -> Value {
    let prev_version = match prev {
        Some(prev) => json!({"type": "string", "pattern": exact(prev), "default": prev}),
        None => json!({"type": "null", "default": null}),
    };

    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "type": "object",
        "properties": {
            "@api": {
                "type": "object",
                "properties": {
                    "type": {"type": "string", "pattern": "^Sample$", "default": "Sample"},
                    "version": {"type": "string", "pattern": exact(version), "default": version},
                    "prev_version": prev_version
                },
                "required": ["type", "version", "prev_version"]
            },
            "name": {"type": "string", "minLength": 1}
        },
        "required": ["@api", "name"]
    })
}

/// `Sample` at 1.0.0 and 1.1.0 with the migration between them.
pub(crate) fn sample_registry() -> Registry {
    let registry = Registry::new();
    registry
        .register(
            "Sample",
            [
                ("1.0.0", schema_json("1.0.0", None)),
                ("1.1.0", schema_json("1.1.0", Some("1.0.0"))),
            ],
            [(
                "1.0.0-1.1.0",
                migration_fn(|mut document| {
                    document["@api"]["version"] = json!("1.1.0");
                    document["@api"]["prev_version"] = json!("1.0.0");
                    Ok(document)
                }),
            )],
        )
        .expect("sample schemas register");
    registry
}
