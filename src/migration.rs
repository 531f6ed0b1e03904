use std::sync::Arc;

use crate::{
    Document,
    api::ApiEnvelope,
    chain::VersionStep,
    error::{BoxError, Error, Result},
    registry::Registry,
    version,
};

/// A migration function as stored in the registry.
pub type MigrateFn = Arc<dyn Fn(Document) -> Result<Document, BoxError> + Send + Sync>;

/// Wraps a function or closure as a [`MigrateFn`].
pub fn migration_fn<F>(f: F) -> MigrateFn
where
    F: Fn(Document) -> Result<Document, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Converts a document from the shape of one schema version to the next.
///
/// Migrations are expected to be pure: no I/O and no retained state. They
/// run on the caller's thread without any timeout.
pub trait Migration: 'static + Send + Sync {
    const CONFIG_TYPE: &'static str;
    const FROM: &'static str;
    const TO: &'static str;

    fn migrate(document: Document) -> Result<Document, BoxError>;
}

/// A migration submitted for discovery.
pub struct RegisteredMigration {
    pub config_type: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub migrate: fn(Document) -> Result<Document, BoxError>,
}

impl RegisteredMigration {
    pub const fn new(
        config_type: &'static str,
        from: &'static str,
        to: &'static str,
        migrate: fn(Document) -> Result<Document, BoxError>,
    ) -> Self {
        Self {
            config_type,
            from,
            to,
            migrate,
        }
    }

    pub const fn of<M: Migration>() -> Self {
        Self::new(M::CONFIG_TYPE, M::FROM, M::TO, M::migrate)
    }

    pub fn key(&self) -> String {
        migration_key(self.from, self.to)
    }

    pub(crate) fn to_fn(&self) -> MigrateFn {
        Arc::new(self.migrate)
    }
}

inventory::collect!(RegisteredMigration);

/// Submits a [`Migration`] implementation for [`Registry::discover`].
#[macro_export]
macro_rules! submit_migration {
    ($migration:ty) => {
        $crate::inventory::submit! {
            $crate::RegisteredMigration::of::<$migration>()
        }
    };
}

pub(crate) fn migration_key(from: &str, to: &str) -> String {
    format!("{from}-{to}")
}

pub(crate) fn parse_migration_key(key: &str) -> Result<(&str, &str)> {
    key.split_once('-')
        .filter(|(from, to)| version::is_well_formed(from) && version::is_well_formed(to))
        .ok_or_else(|| Error::MalformedVersion {
            field: "migration key",
            value: key.to_owned(),
        })
}

impl Registry {
    /// Applies every step of `chain` to a copy of `document`, in order.
    ///
    /// All migration functions are looked up before the first one runs, so a
    /// missing step fails with [`Error::MissingMigration`] without running
    /// anything. A function that fails surfaces as
    /// [`Error::MigrationFailed`] carrying the document's type and original
    /// version. `document` itself is never modified.
    pub fn apply_chain(&self, document: &Document, chain: &[VersionStep]) -> Result<Document> {
        if chain.is_empty() {
            return Ok(document.clone());
        }

        let api = ApiEnvelope::read(document)?;
        let entry = self.entry(&api.config_type)?;

        let steps = chain
            .iter()
            .map(|step| entry.migration(&step.from, &step.to).map(|f| (step, f)))
            .collect::<Result<Vec<_>>>()?;

        let mut working = document.clone();
        for (step, migrate) in steps {
            tracing::debug!(config_type = %api.config_type, %step, "applying migration");

            working = migrate(working).map_err(|source| {
                tracing::warn!(
                    config_type = %api.config_type,
                    version = %api.version,
                    %step,
                    error = %source,
                    "migration failed"
                );
                Error::MigrationFailed {
                    config_type: api.config_type.clone(),
                    version: api.version.clone(),
                    step: step.to_string(),
                    source,
                }
            })?;
        }

        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_registry;
    use serde_json::json;

    fn document() -> Document {
        json!({
            "@api": {"type": "Sample", "version": "1.0.0", "prev_version": null},
            "name": "sample"
        })
    }

    #[test]
    fn test_parse_migration_key() {
        assert_eq!(parse_migration_key("1.0.0-1.0.1").unwrap(), ("1.0.0", "1.0.1"));
        assert!(parse_migration_key("1.0.0").is_err());
        assert!(parse_migration_key("1.0-1.1").is_err());
    }

    #[test]
    fn test_empty_chain_returns_document_unchanged() {
        let registry = sample_registry();
        let migrated = registry.apply_chain(&document(), &[]).unwrap();

        assert_eq!(migrated, document());
    }

    #[test]
    fn test_applies_steps_in_order() {
        let registry = sample_registry();
        let chain = [VersionStep::new("1.0.0", "1.1.0")];
        let migrated = registry.apply_chain(&document(), &chain).unwrap();

        assert_eq!(migrated["@api"]["version"], "1.1.0");
        assert_eq!(migrated["@api"]["prev_version"], "1.0.0");
        assert_eq!(migrated["name"], "sample");
    }

    #[test]
    fn test_missing_migration_names_the_pair() {
        let registry = sample_registry();
        let chain = [
            VersionStep::new("1.0.0", "1.1.0"),
            VersionStep::new("1.1.0", "1.1.1"),
        ];

        let err = registry.apply_chain(&document(), &chain).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingMigration { ref config_type, ref key }
                if config_type == "Sample" && key == "1.1.0-1.1.1"
        ));
    }

    #[test]
    fn test_failing_migration_is_wrapped() {
        let registry = sample_registry();
        registry
            .register(
                "Sample",
                [] as [(&str, serde_json::Value); 0],
                [(
                    "1.0.0-1.1.0",
                    migration_fn(|_| Err("node tree is corrupt".into())),
                )],
            )
            .unwrap();

        let err = registry
            .apply_chain(&document(), &[VersionStep::new("1.0.0", "1.1.0")])
            .unwrap_err();

        match err {
            Error::MigrationFailed {
                config_type,
                version,
                step,
                source,
            } => {
                assert_eq!(config_type, "Sample");
                assert_eq!(version, "1.0.0");
                assert_eq!(step, "1.0.0-1.1.0");
                assert_eq!(source.to_string(), "node tree is corrupt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
