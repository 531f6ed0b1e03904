//! Versioned, schema validated configuration documents.
//!
//! Every document carries an `@api` block naming its config type, its schema
//! version and the version it was derived from. The [`Registry`] holds the
//! schemas and migrations of every config type; [`ConfigManager`] builds new
//! documents from schema defaults, migrates stored ones forward and validates
//! them.

pub mod api;
pub mod builtin;
pub mod chain;
pub mod config;
pub mod defaults;
pub mod error;
pub mod json;
pub mod manager;
pub mod merge;
pub mod migration;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod validate;
pub mod version;

#[cfg(test)]
mod test_support;

pub use api::ApiEnvelope;
pub use chain::{VersionChain, VersionStep};
pub use config::{Config, RegisteredSchema};
pub use error::{BoxError, Error};
pub use manager::ConfigManager;
pub use migration::{MigrateFn, Migration, RegisteredMigration, migration_fn};
pub use registry::{ConfigTypeEntry, Registry};
pub use schema::Schema;
pub use settings::{Settings, SettingsBuilder};
pub use validate::{PathSegment, Status, ValidationError, ValidationResult};

/// An untyped config document.
pub type Document = serde_json::Value;

// re-export macros
pub use jconf_macros::{Config, migration};

#[doc(hidden)]
pub use inventory;
