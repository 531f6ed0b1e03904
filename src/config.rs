use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{Error, Result};

/// A typed record modelling one schema version of a config type.
///
/// The struct's serde representation must be the document itself,
/// `@api` block included. Usually derived:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize, Config)]
/// #[config(config_type = "WsgiServer", version = "1.0.0")]
/// struct WsgiServer { ... }
/// ```
pub trait Config: Send + Sync + Serialize + DeserializeOwned + 'static {
    const CONFIG_TYPE: &'static str;
    const VERSION: &'static str;
}

/// A schema bundle submitted for discovery.
pub struct RegisteredSchema {
    pub config_type: &'static str,
    pub version: &'static str,
    pub schema: &'static str,
}

impl RegisteredSchema {
    pub const fn new(config_type: &'static str, version: &'static str, schema: &'static str) -> Self {
        Self {
            config_type,
            version,
            schema,
        }
    }

    pub fn parse(&self) -> Result<Value> {
        serde_json::from_str(self.schema).map_err(|err| Error::InvalidSchema {
            config_type: self.config_type.to_owned(),
            version: self.version.to_owned(),
            reason: err.to_string(),
        })
    }
}

inventory::collect!(RegisteredSchema);

/// Submits a schema for [`Registry::discover`](crate::Registry::discover).
///
/// ```rust,ignore
/// jconf::submit_schema!("FileTree", "1.0.0", include_str!("file_tree_1_0_0.json"));
/// ```
#[macro_export]
macro_rules! submit_schema {
    ($config_type:expr, $version:expr, $schema:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::RegisteredSchema::new($config_type, $version, $schema)
        }
    };
}
