//! Construction of default documents from a schema.
//!
//! This is a construction pass, not a validation pass. It reads a small
//! subset of draft-04: `properties`, `default`, `type` and local `$ref`s of
//! the form `#/definitions/...`. For every property:
//!
//! - a declared `default` is emitted as is;
//! - without a default, a property of type `"object"` is built recursively,
//!   so nested structure is materialized even when nothing in it has a
//!   default;
//! - any other property is left out.
//!
//! `required`, patterns and the like are ignored; the document is validated
//! separately once caller overrides have been merged in.

use serde_json::{Map, Value};

/// Builds the default document described by `schema`.
pub fn build_default(schema: &Value) -> Value {
    let mut expanding = Vec::new();
    build_object(schema, schema, &mut expanding)
}

fn build_object<'a>(root: &'a Value, schema: &'a Value, expanding: &mut Vec<&'a str>) -> Value {
    let mut object = Map::new();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Value::Object(object);
    };

    for (name, property) in properties {
        let (property, reference) = resolve(root, property);
        let Some(property) = property else {
            continue;
        };

        if let Some(default) = property.get("default") {
            object.insert(name.clone(), default.clone());
            continue;
        }

        if property.get("type").and_then(Value::as_str) != Some("object") {
            continue;
        }

        // A definition that contains itself without defaults stops here.
        if let Some(reference) = reference {
            if expanding.contains(&reference) {
                continue;
            }
            expanding.push(reference);
        }

        let nested = build_object(root, property, expanding);
        if reference.is_some() {
            expanding.pop();
        }
        object.insert(name.clone(), nested);
    }

    Value::Object(object)
}

/// Follows local `$ref`s. Returns the resolved schema, or `None` for a
/// reference that points nowhere, together with the last reference taken.
fn resolve<'a>(root: &'a Value, mut schema: &'a Value) -> (Option<&'a Value>, Option<&'a str>) {
    let mut reference = None;
    let mut hops = Vec::new();

    while let Some(target) = schema.get("$ref").and_then(Value::as_str) {
        if hops.contains(&target) {
            return (None, reference);
        }
        hops.push(target);
        reference = Some(target);

        let Some(pointer) = target.strip_prefix('#') else {
            return (None, reference);
        };
        match root.pointer(pointer) {
            Some(resolved) => schema = resolved,
            None => return (None, reference),
        }
    }

    (Some(schema), reference)
}
