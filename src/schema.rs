//! Schemas describing one version of a config type.
//!
//! A schema is a draft-04 JSON Schema document. Besides structural
//! validation, the engine reads the `@api` block of every schema:
//!
//! ```json
//! "@api": {
//!     "type": "object",
//!     "properties": {
//!         "type":         {"type": "string", "pattern": "^TestConfig$", "default": "TestConfig"},
//!         "version":      {"type": "string", "pattern": "^1\\.0\\.1$", "default": "1.0.1"},
//!         "prev_version": {"type": "string", "pattern": "^1\\.0\\.0$", "default": "1.0.0"}
//!     },
//!     "required": ["type", "version", "prev_version"]
//! }
//! ```
//!
//! The `prev_version` default links each version to the one it was derived
//! from. A `null` or missing default marks the first version of a type.

use std::fmt;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    validate::{PathSegment, ValidationError},
    version,
};

const API_PROPERTIES: &str = "/properties/@api/properties";

pub struct Schema {
    config_type: String,
    version: String,
    prev_version: Option<String>,
    raw: Value,
    compiled: JSONSchema,
}

impl Schema {
    /// Parses the API block of `raw` and compiles it for validation.
    ///
    /// Fails with [`Error::MalformedVersion`] when `version` or the linked
    /// `prev_version` are not `MAJOR.MINOR.PATCH`, and with
    /// [`Error::InvalidSchema`] when the API block contradicts the
    /// registration or the schema does not compile.
    pub fn new(config_type: &str, version: &str, raw: Value) -> Result<Self> {
        if !version::is_well_formed(version) {
            return Err(Error::MalformedVersion {
                field: "schema version",
                value: version.to_owned(),
            });
        }

        let invalid = |reason: String| Error::InvalidSchema {
            config_type: config_type.to_owned(),
            version: version.to_owned(),
            reason,
        };

        if raw.pointer(API_PROPERTIES).is_none() {
            return Err(invalid("schema has no @api properties block".to_owned()));
        }

        let prev_version = match api_default(&raw, "prev_version") {
            None | Some(Value::Null) => None,
            Some(Value::String(prev)) if version::is_well_formed(prev) => Some(prev.clone()),
            Some(Value::String(prev)) => {
                return Err(Error::MalformedVersion {
                    field: "prev_version",
                    value: prev.clone(),
                });
            }
            Some(other) => return Err(invalid(format!("prev_version default is {other}"))),
        };

        for (field, expected) in [("type", config_type), ("version", version)] {
            match api_default(&raw, field) {
                Some(declared) if declared.as_str() != Some(expected) => {
                    return Err(invalid(format!(
                        "@api {field} default {declared} does not match \"{expected}\""
                    )));
                }
                _ => {}
            }
        }

        tracing::trace!(config_type, version, "compiling schema");
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft4)
            .compile(&raw)
            .map_err(|err| invalid(err.to_string()))?;

        Ok(Self {
            config_type: config_type.to_owned(),
            version: version.to_owned(),
            prev_version,
            raw,
            compiled,
        })
    }

    pub fn config_type(&self) -> &str {
        &self.config_type
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The version this schema was derived from, `None` for a first version.
    pub fn prev_version(&self) -> Option<&str> {
        self.prev_version.as_deref()
    }

    /// The schema document as registered.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validates `document` against the full schema.
    ///
    /// Every violation is collected and the result is sorted by the path of
    /// the offending value, so identical input always yields the same order.
    pub fn validate(&self, document: &Value) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    let message = error.to_string();
                    let path =
                        PathSegment::from_pointer(document, error.instance_path.into_vec());
                    ValidationError::new(path, message)
                })
                .collect(),
        };

        errors.sort_by(|a, b| a.path().cmp(b.path()));
        errors
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("config_type", &self.config_type)
            .field("version", &self.version)
            .field("prev_version", &self.prev_version)
            .finish_non_exhaustive()
    }
}

fn api_default<'a>(raw: &'a Value, field: &str) -> Option<&'a Value> {
    raw.pointer(&format!("{API_PROPERTIES}/{field}/default"))
}
