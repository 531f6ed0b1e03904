//! High level operations on config documents.
//!
//! [`ConfigManager`] ties the registry to the workflows callers need:
//!
//! - **Create**: build the default document of a schema version, merge the
//!   caller's overrides on top and validate the result.
//! - **Update**: migrate a document up to the latest (or a given) version.
//! - **Load**: parse stored JSON text, optionally update it, and validate.
//! - **Typed access**: the same, deserialized into a [`Config`] record.
//!
//! # Example
//!
//! ```rust
//! use jconf::{ConfigManager, Settings};
//! use serde_json::json;
//!
//! let manager = ConfigManager::discover(Settings::default())?;
//!
//! let overrides = json!({"server": {"port": 8080}});
//! let config = manager.create_new_config("WsgiServer", Some(&overrides), None)?;
//!
//! assert_eq!(config["server"]["address"], "localhost");
//! assert_eq!(config["server"]["port"], 8080);
//! assert!(manager.validate_config(&config).is_ok());
//! # Ok::<(), jconf::error::Error>(())
//! ```

use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    Config, Document,
    chain::VersionStep,
    defaults::build_default,
    error::{Error, Result},
    json::loads,
    merge,
    registry::Registry,
    settings::Settings,
    validate::ValidationResult,
};

const CONFIG_ID_KEY: &str = "@config_id";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    registry: Arc<Registry>,
    settings: Settings,
}

impl ConfigManager {
    pub fn new(registry: Arc<Registry>, settings: Settings) -> Self {
        Self { registry, settings }
    }

    /// Creates a manager over a registry built by
    /// [`Registry::discover`].
    pub fn discover(settings: Settings) -> Result<Self> {
        let registry = Registry::discover(&settings)?;
        Ok(Self::new(Arc::new(registry), settings))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Creates a new document of `config_type`.
    ///
    /// The default document of the schema at `version` (latest when `None`)
    /// is merged under a copy of `overrides`, so overrides win. Unless
    /// disabled in [`Settings`], a document without `@config_id` gets a
    /// fresh one. The result must validate, otherwise
    /// [`Error::InvalidConfig`] names the first violation.
    pub fn create_new_config(
        &self,
        config_type: &str,
        overrides: Option<&Document>,
        version: Option<&str>,
    ) -> Result<Document> {
        let version = match version {
            Some(version) => version.to_owned(),
            None => self.registry.latest(config_type)?,
        };
        let schema = self.registry.schema(config_type, &version)?;
        let defaults = build_default(schema.raw());

        let mut document = overrides.cloned().unwrap_or_else(|| json!({}));
        if self.settings.assign_config_id
            && document.is_object()
            && document.get(CONFIG_ID_KEY).is_none_or(Value::is_null)
        {
            document[CONFIG_ID_KEY] = json!(new_config_id());
        }
        merge::merge(&mut document, &defaults)?;

        self.ensure_valid(&document)?;
        tracing::info!(config_type, %version, "created config");

        Ok(document)
    }

    /// Migrates a document to the latest version of its type.
    ///
    /// The input is not validated first; validate the result before use.
    pub fn update_config(&self, document: &Document) -> Result<Document> {
        self.registry.update(document)
    }

    /// Migrates a document to `version`.
    pub fn update_config_to(&self, document: &Document, version: &str) -> Result<Document> {
        self.registry.update_to(document, version)
    }

    /// Migrates a document along an explicit chain of steps.
    pub fn update_config_with_chain(&self, document: &Document, chain: &[VersionStep]) -> Result<Document> {
        self.registry.update_with_chain(document, chain)
    }

    pub fn validate_config(&self, document: &Document) -> ValidationResult {
        self.registry.validate(document)
    }

    /// Parses a stored document, updating it to the latest version when
    /// `get_latest` is set, and returns it once it validates.
    pub fn load_config(&self, text: &str, get_latest: bool) -> Result<Document> {
        let mut document = loads(text, true)?;
        if get_latest {
            document = self.update_config(&document)?;
        }

        self.ensure_valid(&document)?;
        Ok(document)
    }

    /// Creates a default record of `T`.
    pub fn create_typed<T: Config>(&self) -> Result<T> {
        let document = self.create_new_config(T::CONFIG_TYPE, None, Some(T::VERSION))?;
        Ok(serde_json::from_value(document)?)
    }

    /// Loads a stored document as `T`, migrating it up to `T::VERSION`.
    pub fn load_typed<T: Config>(&self, text: &str) -> Result<T> {
        let document = loads(text, true)?;
        let document = self.update_config_to(&document, T::VERSION)?;

        self.ensure_valid(&document)?;
        Ok(serde_json::from_value(document)?)
    }

    /// Serializes a record and checks it against its schema.
    pub fn to_document<T: Config>(&self, config: &T) -> Result<Document> {
        let document = serde_json::to_value(config)?;
        self.ensure_valid(&document)?;
        Ok(document)
    }

    fn ensure_valid(&self, document: &Document) -> Result<()> {
        let result = self.registry.validate(document);
        let Some(first) = result.first_error() else {
            return Ok(());
        };

        let api = &document["@api"];
        let describe = |field: &str| api[field].as_str().unwrap_or("unknown").to_owned();
        tracing::debug!(errors = result.errors.len(), "config failed validation");

        Err(Error::InvalidConfig {
            config_type: describe("type"),
            version: describe("version"),
            error: first.clone(),
        })
    }
}

fn new_config_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
