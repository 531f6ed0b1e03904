use thiserror::Error;

use crate::{merge::MergeError, validate::ValidationError};

/// Boxed error returned by user supplied migration functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the registry and the operations that depend on it.
///
/// These indicate a broken or misconfigured registry, or a document that
/// could not be brought into shape. Ordinary validation failures are not
/// errors: they are returned as [`ValidationError`] values inside a
/// [`ValidationResult`](crate::ValidationResult).
#[derive(Debug, Error)]
pub enum Error {
    /// Attempted to access a config type that was never registered.
    ///
    /// # How to Fix
    ///
    /// Register the type's schemas, either explicitly through
    /// [`Registry::register`](crate::Registry::register) or through
    /// [`submit_schema!`](crate::submit_schema) and
    /// [`Registry::discover`](crate::Registry::discover).
    #[error("Config type not registered: {0}")]
    UnknownType(String),

    #[error("Config type {config_type} has no schema registered for version {version}")]
    UnknownVersion { config_type: String, version: String },

    #[error("Illegally formatted {field}: \"{value}\"")]
    MalformedVersion { field: &'static str, value: String },

    /// Walking the `prev_version` links backwards did not reach the
    /// requested version.
    #[error("Broken version chain for {config_type} at {version}: {reason}")]
    BrokenVersionChain {
        config_type: String,
        version: String,
        reason: String,
    },

    /// The contained key is the exact `"from-to"` pair that has no
    /// registered migration function.
    #[error("Conversion method missing for {config_type} versions {key}")]
    MissingMigration { config_type: String, key: String },

    #[error(
        "Config update failed! Config type: {config_type}, config version: {version}. Step {step} raised: {source}"
    )]
    MigrationFailed {
        config_type: String,
        version: String,
        step: String,
        #[source]
        source: BoxError,
    },

    /// A document failed validation where the caller needed a valid one.
    ///
    /// Only the first structural violation is carried.
    #[error("Validation failed! Config type: {config_type}, config version: {version}. {error}")]
    InvalidConfig {
        config_type: String,
        version: String,
        error: ValidationError,
    },

    #[error("Invalid schema for {config_type} {version}: {reason}")]
    InvalidSchema {
        config_type: String,
        version: String,
        reason: String,
    },

    #[error("Config api field missing: {0}")]
    MissingApiField(&'static str),

    #[error("Merge: {0}")]
    Merge(#[from] MergeError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings: {0}")]
    Settings(#[from] toml::de::Error),
}
