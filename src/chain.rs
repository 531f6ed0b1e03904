//! Resolution of migration chains from `prev_version` links.
//!
//! Every schema names the version it was derived from. Walking those links
//! back from a newer version yields the ordered list of adjacent steps that
//! carry a document forward, oldest step first.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use crate::{
    Document,
    api::ApiEnvelope,
    error::{Error, Result},
    migration::migration_key,
    registry::{ConfigTypeEntry, Registry},
};

/// One adjacent migration step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionStep {
    pub from: String,
    pub to: String,
}

impl VersionStep {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The `"from-to"` key the migration is registered under.
    pub fn key(&self) -> String {
        migration_key(&self.from, &self.to)
    }
}

impl fmt::Display for VersionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

pub type VersionChain = Vec<VersionStep>;

impl Registry {
    /// Resolves the steps that migrate a document at `version` up to
    /// `latest`.
    ///
    /// Equal versions give an empty chain. Both versions must be registered
    /// for the type. The walk fails with [`Error::BrokenVersionChain`] when a
    /// link names an unregistered version, when the links loop, or when
    /// the first version is reached without passing `version`.
    pub fn resolve_chain(&self, config_type: &str, version: &str, latest: &str) -> Result<VersionChain> {
        if version == latest {
            return Ok(Vec::new());
        }

        let entry = self.entry(config_type)?;
        entry.schema(version)?;
        entry.schema(latest)?;

        let chain = walk_back(&entry, latest, Some(version))?;
        tracing::debug!(
            config_type,
            version,
            latest,
            steps = chain.len(),
            "resolved version chain"
        );

        Ok(chain)
    }

    /// Checks that every registered version of a type links back to a first
    /// version through registered versions only.
    pub fn verify_links(&self, config_type: &str) -> Result<()> {
        let entry = self.entry(config_type)?;
        for version in entry.versions() {
            walk_back(&entry, version, None)?;
        }

        Ok(())
    }

    /// Migrates a document to the latest registered version of its type.
    pub fn update(&self, document: &Document) -> Result<Document> {
        let api = ApiEnvelope::read(document)?;
        let latest = self.latest(&api.config_type)?;
        self.update_to(document, &latest)
    }

    /// Migrates a document to `version`, which must be the document's own
    /// version or one derived from it.
    pub fn update_to(&self, document: &Document, version: &str) -> Result<Document> {
        let api = ApiEnvelope::read(document)?;
        let chain = self.resolve_chain(&api.config_type, &api.version, version)?;
        self.apply_chain(document, &chain)
    }

    /// Migrates a document along an explicit chain.
    pub fn update_with_chain(&self, document: &Document, chain: &[VersionStep]) -> Result<Document> {
        self.apply_chain(document, chain)
    }
}

/// Follows `prev_version` links back from `start`. With a `target`, stops
/// once the link to it is taken; without one, walks to the first version.
fn walk_back(entry: &ConfigTypeEntry, start: &str, target: Option<&str>) -> Result<VersionChain> {
    let broken = |version: &str, reason: String| Error::BrokenVersionChain {
        config_type: entry.name().to_owned(),
        version: version.to_owned(),
        reason,
    };

    let mut steps = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start;

    loop {
        if !visited.insert(current) {
            return Err(broken(start, format!("prev_version links loop at {current}")));
        }

        let schema = entry
            .schema(current)
            .map_err(|_| broken(start, format!("{current} is linked but not registered")))?;

        match (schema.prev_version(), target) {
            (None, None) => break,
            (None, Some(target)) => {
                return Err(broken(start, format!("{target} is not an earlier version")));
            }
            (Some(prev), _) => {
                steps.push(VersionStep::new(prev, current));
                if target == Some(prev) {
                    break;
                }
                current = prev;
            }
        }
    }

    steps.reverse();
    Ok(steps)
}
