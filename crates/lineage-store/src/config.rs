//! Store configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cap on chains returned by one chain query
pub const DEFAULT_MAX_CHAINS: usize = 10_000;

/// Provenance store configuration
///
/// ```toml
/// journal_path = ".lineage/journal.jsonl"
/// max_chains = 10000
/// default_max_depth = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// File journal location; in-memory journal when absent
    pub journal_path: Option<PathBuf>,
    /// Chain enumeration stops after this many chains
    pub max_chains: usize,
    /// Depth applied by `downstream_of` when the caller passes none
    pub default_max_depth: Option<usize>,
}

impl StoreConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    #[inline]
    #[must_use]
    pub fn with_journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_chains(mut self, max_chains: usize) -> Self {
        self.max_chains = max_chains;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_default_max_depth(mut self, depth: usize) -> Self {
        self.default_max_depth = Some(depth);
        self
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `max_chains` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chains == 0 {
            return Err(ConfigError::Invalid("max_chains must be positive".into()));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            journal_path: None,
            max_chains: DEFAULT_MAX_CHAINS,
            default_max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.max_chains, DEFAULT_MAX_CHAINS);
        assert!(config.journal_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_toml_fills_defaults() {
        let config = StoreConfig::from_toml_str("default_max_depth = 3").unwrap();
        assert_eq!(config.default_max_depth, Some(3));
        assert_eq!(config.max_chains, DEFAULT_MAX_CHAINS);
    }

    #[test]
    fn config_rejects_zero_chains() {
        assert!(matches!(
            StoreConfig::from_toml_str("max_chains = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(StoreConfig::new().with_max_chains(0).validate().is_err());
    }

    #[test]
    fn config_rejects_unknown_keys() {
        assert!(matches!(
            StoreConfig::from_toml_str("max_chain = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.toml");
        std::fs::write(&path, "journal_path = \"journal.jsonl\"\nmax_chains = 50\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config, StoreConfig::new().with_journal_path("journal.jsonl").with_max_chains(50));
        assert!(matches!(
            StoreConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
