//! Registry of config types, their schema versions and migrations.
//!
//! The [`Registry`] maps every config type name to a [`ConfigTypeEntry`]
//! holding the schemas registered per version and the migration functions
//! registered per `"from-to"` version pair.
//!
//! # Lifecycle
//!
//! Types are registered once, at start-up, either explicitly through
//! [`register`](Registry::register) or by collecting every
//! [`submit_schema!`](crate::submit_schema) and migration submission in the
//! binary with [`discover`](Registry::discover). After that the registry is
//! only read. [`unregister_all`](Registry::unregister_all) clears it, which
//! is mostly useful for tests.
//!
//! Registration takes an exclusive lock. Lookups hold the shared lock only
//! long enough to clone the entry's [`Arc`], so validation and migrations
//! never run under the lock.
//!
//! # Example
//!
//! ```rust
//! use jconf::Registry;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "@api": {
//!             "type": "object",
//!             "properties": {
//!                 "type": {"type": "string", "default": "Greeter"},
//!                 "version": {"type": "string", "default": "1.0.0"},
//!                 "prev_version": {"type": "null", "default": null}
//!             }
//!         },
//!         "greeting": {"type": "string", "default": "hello"}
//!     }
//! });
//!
//! let registry = Registry::new();
//! registry.register_schemas("Greeter", [("1.0.0", schema)])?;
//!
//! assert_eq!(registry.latest("Greeter")?, "1.0.0");
//! # Ok::<(), jconf::error::Error>(())
//! ```

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::Arc,
};

use parking_lot::RwLock;
use serde_json::Value;

use crate::{
    builtin,
    config::RegisteredSchema,
    error::{Error, Result},
    migration::{MigrateFn, RegisteredMigration, migration_key, parse_migration_key},
    schema::Schema,
    settings::Settings,
    version,
};

/// Everything registered for one config type.
#[derive(Clone)]
pub struct ConfigTypeEntry {
    name: String,
    schemas: HashMap<String, Arc<Schema>>,
    migrations: HashMap<String, MigrateFn>,
}

impl ConfigTypeEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            schemas: HashMap::new(),
            migrations: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered versions in ascending version order.
    pub fn versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        version::sort_versions(&mut versions);
        versions
    }

    pub fn latest(&self) -> Option<&str> {
        version::latest_of(self.schemas.keys().map(String::as_str))
    }

    pub fn schema(&self, version: &str) -> Result<&Arc<Schema>> {
        self.schemas
            .get(version)
            .ok_or_else(|| Error::UnknownVersion {
                config_type: self.name.clone(),
                version: version.to_owned(),
            })
    }

    /// Looks up the function migrating documents from `from` to `to`.
    pub fn migration(&self, from: &str, to: &str) -> Result<&MigrateFn> {
        let key = migration_key(from, to);
        self.migrations
            .get(&key)
            .ok_or_else(|| Error::MissingMigration {
                config_type: self.name.clone(),
                key,
            })
    }

    /// Registered `"from-to"` keys, sorted.
    pub fn migration_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.migrations.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for ConfigTypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigTypeEntry")
            .field("name", &self.name)
            .field("versions", &self.versions())
            .field("migrations", &self.migration_keys())
            .finish()
    }
}

#[derive(Default)]
pub struct Registry {
    types: RwLock<HashMap<String, Arc<ConfigTypeEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds schemas and migrations to a config type, creating it if needed.
    ///
    /// Registration is additive: versions and migration keys registered
    /// earlier stay, and registering the same version or key again replaces
    /// it. Every schema is parsed and compiled before the registry is
    /// touched, so a failing call registers nothing.
    ///
    /// A config type only comes into existence with at least one schema:
    /// adding nothing but migrations to an unregistered type fails with
    /// [`Error::UnknownType`].
    ///
    /// Migration keys have the form `"from-to"`, e.g. `"1.0.0-1.0.1"`.
    pub fn register<S, K, M, L>(&self, config_type: &str, schemas: S, migrations: M) -> Result<()>
    where
        S: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
        M: IntoIterator<Item = (L, MigrateFn)>,
        L: AsRef<str>,
    {
        let schemas = schemas
            .into_iter()
            .map(|(version, raw)| -> Result<_> {
                let schema = Schema::new(config_type, version.as_ref(), raw)?;
                Ok((version.as_ref().to_owned(), Arc::new(schema)))
            })
            .collect::<Result<Vec<_>>>()?;

        let migrations = migrations
            .into_iter()
            .map(|(key, migrate)| -> Result<_> {
                let (from, to) = parse_migration_key(key.as_ref())?;
                Ok((migration_key(from, to), migrate))
            })
            .collect::<Result<Vec<_>>>()?;

        let (schema_count, migration_count) = (schemas.len(), migrations.len());

        let mut types = self.types.write();
        if schemas.is_empty() && !types.contains_key(config_type) {
            return Err(Error::UnknownType(config_type.to_owned()));
        }
        let entry = types
            .entry(config_type.to_owned())
            .or_insert_with(|| Arc::new(ConfigTypeEntry::new(config_type)));
        let entry = Arc::make_mut(entry);

        for (version, schema) in schemas {
            if entry.schemas.insert(version.clone(), schema).is_some() {
                tracing::debug!(config_type, %version, "replaced registered schema");
            }
        }
        entry.migrations.extend(migrations);

        tracing::info!(
            config_type,
            schemas = schema_count,
            migrations = migration_count,
            "registered config type"
        );

        Ok(())
    }

    /// Registers schemas without any migrations.
    pub fn register_schemas<S, K>(&self, config_type: &str, schemas: S) -> Result<()>
    where
        S: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.register(config_type, schemas, std::iter::empty::<(&str, MigrateFn)>())
    }

    /// Removes every registered config type.
    pub fn unregister_all(&self) {
        self.types.write().clear();
    }

    pub fn contains(&self, config_type: &str) -> bool {
        self.types.read().contains_key(config_type)
    }

    /// Registered config type names, sorted.
    pub fn config_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn entry(&self, config_type: &str) -> Result<Arc<ConfigTypeEntry>> {
        self.types
            .read()
            .get(config_type)
            .cloned()
            .ok_or_else(|| Error::UnknownType(config_type.to_owned()))
    }

    /// Registered versions of a config type in ascending version order.
    pub fn list_versions(&self, config_type: &str) -> Result<Vec<String>> {
        let entry = self.entry(config_type)?;
        Ok(entry.versions().into_iter().map(str::to_owned).collect())
    }

    /// The greatest registered version of a config type.
    pub fn latest(&self, config_type: &str) -> Result<String> {
        let entry = self.entry(config_type)?;
        entry
            .latest()
            .map(str::to_owned)
            .ok_or_else(|| Error::UnknownVersion {
                config_type: config_type.to_owned(),
                version: "latest".to_owned(),
            })
    }

    pub fn schema(&self, config_type: &str, version: &str) -> Result<Arc<Schema>> {
        self.entry(config_type)?.schema(version).cloned()
    }

    /// Builds a registry from the built-in schemas plus every schema and
    /// migration submitted in this binary.
    ///
    /// Submissions are filtered by [`Settings::include_types`]. With
    /// [`Settings::verify_chains`] set, every type's `prev_version` links
    /// are verified so a malformed history fails here rather than on the
    /// first migration.
    pub fn discover(settings: &Settings) -> Result<Self> {
        let included = |config_type: &str| {
            settings
                .include_types
                .as_ref()
                .is_none_or(|names| names.iter().any(|name| name == config_type))
        };

        let mut schemas: BTreeMap<&str, Vec<(&str, Value)>> = BTreeMap::new();
        let mut seen = HashSet::new();
        let submitted = builtin::SCHEMAS
            .iter()
            .chain(inventory::iter::<RegisteredSchema>);
        for registration in submitted {
            if !included(registration.config_type) {
                continue;
            }
            if !seen.insert((registration.config_type, registration.version)) {
                tracing::warn!(
                    config_type = registration.config_type,
                    version = registration.version,
                    "schema submitted more than once, keeping the last one"
                );
            }

            let raw = registration.parse()?;
            schemas
                .entry(registration.config_type)
                .or_default()
                .push((registration.version, raw));
        }

        let mut migrations: BTreeMap<&str, Vec<(String, MigrateFn)>> = BTreeMap::new();
        for registration in inventory::iter::<RegisteredMigration> {
            if !included(registration.config_type) {
                continue;
            }
            migrations
                .entry(registration.config_type)
                .or_default()
                .push((registration.key(), registration.to_fn()));
        }

        let registry = Self::new();
        for (config_type, versions) in schemas {
            let migrations = migrations.remove(config_type).unwrap_or_default();
            registry.register(config_type, versions, migrations)?;
        }

        for config_type in migrations.keys() {
            tracing::warn!(config_type, "migrations submitted for a config type without schemas");
        }

        if settings.verify_chains {
            for config_type in registry.config_types() {
                registry.verify_links(&config_type)?;
            }
        }

        Ok(registry)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.config_types())
            .finish()
    }
}
