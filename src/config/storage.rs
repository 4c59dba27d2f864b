//! State store selection

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Which conversation state store backs the dispatcher
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    Redis,
}

/// State store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::File && self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__PATH"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/conversations")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.path, PathBuf::from("./data/conversations"));
    }

    #[test]
    fn test_backend_deserialization() {
        let config: StorageConfig = serde_json::from_str(r#"{"backend": "redis"}"#).unwrap();
        assert_eq!(config.backend, StorageBackend::Redis);

        let result: Result<StorageConfig, _> = serde_json::from_str(r#"{"backend": "postgres"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_file_backend_needs_path() {
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: PathBuf::new(),
        };
        assert!(config.validate().is_err());
    }
}
