//! Configuration for an [`ObjectStorage`](crate::ObjectStorage).

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};

/// Configuration for one object storage partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Prefix prepended to every key written to the backend, so several
    /// object kinds can share one key/value store.
    pub realm: String,

    /// Lengths of the components that make up a key. When non-empty, every
    /// stored key must be exactly their sum.
    pub key_partition: Vec<usize>,

    /// Write objects through to the backend on `store` instead of waiting
    /// for the next `flush`.
    pub persist_on_store: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            realm: String::new(),
            key_partition: Vec::new(),
            persist_on_store: false,
        }
    }
}

impl StorageConfig {
    /// Create a configuration for the given realm.
    pub fn new(realm: impl Into<String>) -> Self {
        StorageConfig {
            realm: realm.into(),
            ..Default::default()
        }
    }

    /// Set the key partition.
    pub fn with_key_partition(mut self, partition: Vec<usize>) -> Self {
        self.key_partition = partition;
        self
    }

    /// Enable or disable write-through persistence.
    pub fn with_persist_on_store(mut self, persist: bool) -> Self {
        self.persist_on_store = persist;
        self
    }

    /// Expected key length, if a partition is configured.
    pub fn key_length(&self) -> Option<usize> {
        if self.key_partition.is_empty() {
            None
        } else {
            Some(self.key_partition.iter().sum())
        }
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StorageConfig = serde_json::from_str(json)?;
        if config.key_partition.iter().any(|len| *len == 0) {
            return Err(StorageError::Config(
                "key partition components must be non-empty".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert!(config.realm.is_empty());
        assert_eq!(config.key_length(), None);
        assert!(!config.persist_on_store);
    }

    #[test]
    fn test_builder() {
        let config = StorageConfig::new("conflict_members")
            .with_key_partition(vec![34, 32])
            .with_persist_on_store(true);
        assert_eq!(config.realm, "conflict_members");
        assert_eq!(config.key_length(), Some(66));
        assert!(config.persist_on_store);
    }

    #[test]
    fn test_from_json_partial() {
        let config = StorageConfig::from_json(r#"{"realm": "conflicts"}"#).unwrap();
        assert_eq!(config.realm, "conflicts");
        assert!(config.key_partition.is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            StorageConfig::from_json("{not json"),
            Err(StorageError::Config(_))
        ));
        assert!(matches!(
            StorageConfig::from_json(r#"{"key_partition": [34, 0]}"#),
            Err(StorageError::Config(_))
        ));
    }
}
