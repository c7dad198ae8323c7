//! I/O configuration
//!
//! Loaded from a YAML file or environment overrides:
//!
//! ```yaml
//! duplicate_policy: reject     # or overwrite
//! mapping_move_to_meta: false
//! ```
//!
//! Resolution order in [`IoConfig::from_env`]:
//! 1. `COSMO_IO_CONFIG` - path to a YAML config file
//! 2. `COSMO_IO_DUPLICATE_TAGS` - `reject` / `overwrite`
//! 3. defaults

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "COSMO_IO_CONFIG";
pub const DUPLICATE_TAGS_ENV: &str = "COSMO_IO_DUPLICATE_TAGS";

/// What registration does when a key is already bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with a duplicate error, leaving the first binding in place.
    #[default]
    Reject,
    /// Replace the earlier binding (last registration wins).
    Overwrite,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!(
                "unknown duplicate policy '{}' (expected 'reject' or 'overwrite')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IoConfig {
    /// Applies to tag, representer and format registration.
    pub duplicate_policy: DuplicatePolicy,
    /// Whether the `mapping` reader folds unknown keys into metadata.
    /// The YAML reader never does.
    pub mapping_move_to_meta: bool,
}

impl IoConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse I/O configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading I/O configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(path);
        }

        let mut config = Self::default();
        if let Ok(policy) = std::env::var(DUPLICATE_TAGS_ENV) {
            config.duplicate_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", DUPLICATE_TAGS_ENV))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = IoConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(!config.mapping_move_to_meta);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = IoConfig::from_yaml_str("duplicate_policy: overwrite\n").unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Overwrite);
        assert!(!config.mapping_move_to_meta);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(IoConfig::from_yaml_str("duplicate_tags: overwrite\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mapping_move_to_meta: true").unwrap();
        let config = IoConfig::load(file.path()).unwrap();
        assert!(config.mapping_move_to_meta);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_load_missing_file() {
        let err = IoConfig::load("/nonexistent/cosmo-io.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(" Overwrite ".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Overwrite));
        assert!("sometimes".parse::<DuplicatePolicy>().is_err());
    }
}
