use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    validate::API_KEY,
};

/// The `@api` block every document carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "type")]
    pub config_type: String,
    pub version: String,
    pub prev_version: Option<String>,
}

impl ApiEnvelope {
    pub fn new(config_type: impl Into<String>, version: impl Into<String>, prev_version: Option<&str>) -> Self {
        Self {
            config_type: config_type.into(),
            version: version.into(),
            prev_version: prev_version.map(str::to_owned),
        }
    }

    /// Reads the type and version of `document` without validating them.
    ///
    /// A missing or non-string `prev_version` reads as `None`.
    pub fn read(document: &Value) -> Result<Self> {
        let api = document.get(API_KEY).ok_or(Error::MissingApiField("@api"))?;
        let field = |name: &'static str, path: &'static str| {
            api.get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or(Error::MissingApiField(path))
        };

        Ok(Self {
            config_type: field("type", "@api.type")?,
            version: field("version", "@api.version")?,
            prev_version: api
                .get("prev_version")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }
}
