//! Validation of documents against their registered schema.
//!
//! Validation runs in two stages. The envelope stage checks the `@api`
//! block (type, version, prev_version) against the registry. Only when it
//! passes does the schema stage validate the full document against the
//! schema registered for `(type, version)`. Each call starts from scratch;
//! nothing is remembered between calls.
//!
//! Failures here are data, never [`Error`](crate::Error)s: a document that
//! does not conform is a routine outcome.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{registry::Registry, version};

/// One step of the path to an offending value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Reads the chunks of a JSON pointer into `document`. A chunk is an
    /// [`PathSegment::Index`] only where the value it steps into is an
    /// array; object keys made of digits stay keys.
    pub(crate) fn from_pointer(document: &Value, chunks: Vec<String>) -> Vec<Self> {
        let mut current = Some(document);
        chunks
            .into_iter()
            .map(|chunk| match current {
                Some(Value::Array(items)) => match chunk.parse::<usize>() {
                    Ok(index) => {
                        current = items.get(index);
                        Self::Index(index)
                    }
                    Err(_) => {
                        current = None;
                        Self::Key(chunk)
                    }
                },
                Some(Value::Object(object)) => {
                    current = object.get(&chunk);
                    Self::Key(chunk)
                }
                _ => {
                    current = None;
                    Self::Key(chunk)
                }
            })
            .collect()
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single structural violation found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    path: Vec<PathSegment>,
    message: String,
}

impl ValidationError {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    fn at_api(field: Option<&str>, message: impl Into<String>) -> Self {
        let mut path = vec![PathSegment::Key(API_KEY.to_owned())];
        path.extend(field.map(|f| PathSegment::Key(f.to_owned())));
        Self::new(path, message)
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The path rendered as a JSON pointer, `""` for the document root.
    pub fn pointer(&self) -> String {
        self.path.iter().map(|segment| format!("/{segment}")).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub status: Status,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        let status = match errors.is_empty() {
            true => Status::Ok,
            false => Status::Error,
        };
        Self { status, errors }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }
}

pub(crate) const API_KEY: &str = "@api";

impl Registry {
    /// Checks the `@api` block of a document against the registry.
    ///
    /// Checks run in order and short-circuit where later checks would be
    /// meaningless: a missing or unregistered type stops immediately, as does
    /// a missing version. A malformed version skips the registration check.
    pub fn validate_envelope(&self, document: &Value) -> ValidationResult {
        ValidationResult::from_errors(self.envelope_errors(document))
    }

    /// Validates the full document against the schema for its `(type,
    /// version)`, collecting every structural violation.
    ///
    /// Meant to run after [`validate_envelope`](Self::validate_envelope)
    /// succeeded; [`validate`](Self::validate) chains the two.
    pub fn validate_schema(&self, document: &Value) -> ValidationResult {
        let api = &document[API_KEY];
        let errors = match (api["type"].as_str(), api["version"].as_str()) {
            (Some(config_type), Some(version)) => match self.schema(config_type, version) {
                Ok(schema) => schema.validate(document),
                Err(err) => vec![ValidationError::at_api(None, err.to_string())],
            },
            _ => vec![ValidationError::at_api(
                None,
                "Config api type or version missing.",
            )],
        };

        ValidationResult::from_errors(errors)
    }

    /// Runs both stages; `ok` only when neither reports an error.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        let envelope = self.validate_envelope(document);
        if !envelope.is_ok() {
            return envelope;
        }

        self.validate_schema(document)
    }

    fn envelope_errors(&self, document: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let api = document.get(API_KEY);

        let Some(api) = api.and_then(Value::as_object) else {
            errors.push(ValidationError::new(
                Vec::new(),
                format!("'{API_KEY}' is a required property"),
            ));
            return errors;
        };

        let config_type = match api.get("type") {
            None | Some(Value::Null) => {
                errors.push(ValidationError::at_api(None, "'type' is a required property"));
                return errors;
            }
            Some(Value::String(config_type)) if !config_type.is_empty() => config_type,
            Some(other) => {
                errors.push(ValidationError::at_api(
                    Some("type"),
                    format!("Config api type is not a type name: {other}"),
                ));
                return errors;
            }
        };

        if !self.contains(config_type) {
            errors.push(ValidationError::at_api(
                Some("type"),
                format!("Config api type not registered: \"{config_type}\""),
            ));
            return errors;
        }

        let Some(config_version) = api.get("version").and_then(Value::as_str) else {
            errors.push(ValidationError::at_api(None, "Config api version missing."));
            return errors;
        };

        let version_ok = version::is_well_formed(config_version);
        if !version_ok {
            errors.push(ValidationError::at_api(
                Some("version"),
                format!("Illegally formatted config api version: \"{config_version}\""),
            ));
        }

        match api.get("prev_version") {
            None => errors.push(ValidationError::at_api(
                None,
                "Config api previous version missing.",
            )),
            Some(Value::Null) => {}
            Some(Value::String(prev)) if version::is_well_formed(prev) => {}
            Some(prev) => {
                let prev = prev.as_str().map_or_else(|| prev.to_string(), str::to_owned);
                errors.push(ValidationError::at_api(
                    Some("prev_version"),
                    format!("Illegally formatted config api previous version: \"{prev}\""),
                ));
                return errors;
            }
        }

        if version_ok && self.schema(config_type, config_version).is_err() {
            errors.push(ValidationError::at_api(
                Some("version"),
                format!("Config api version not registered: \"{config_version}\""),
            ));
        }

        errors
    }
}
