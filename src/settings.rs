//! Engine settings.
//!
//! Settings are either built in code:
//!
//! ```rust
//! use jconf::Settings;
//!
//! let settings = Settings::builder()
//!     .include_types(vec!["WsgiServer".to_owned()])
//!     .assign_config_id(false)
//!     .build()?;
//! assert!(settings.verify_chains);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! or read from TOML, where every key is optional:
//!
//! ```toml
//! include_types = ["WsgiServer", "FileTree"]
//! assign_config_id = true
//! verify_chains = true
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct Settings {
    /// Restricts discovery to these config types. `None` discovers all.
    #[builder(setter(into, strip_option))]
    pub include_types: Option<Vec<String>>,

    /// Assigns a fresh `@config_id` to new documents whose overrides lack
    /// one.
    pub assign_config_id: bool,

    /// Verifies every type's `prev_version` links after discovery.
    pub verify_chains: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_types: None,
            assign_config_id: true,
            verify_chains: true,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(Settings::builder().build().unwrap(), Settings::default());
    }

    #[test]
    fn test_from_toml_fills_missing_keys() {
        let settings = Settings::from_toml_str("include_types = [\"FileTree\"]").unwrap();

        assert_eq!(settings.include_types, Some(vec!["FileTree".to_owned()]));
        assert!(settings.assign_config_id);
        assert!(settings.verify_chains);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(Settings::from_toml_str("verify_chains = \"yes\"").is_err());
    }
}
