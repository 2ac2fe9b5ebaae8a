//! YAML configuration for the service.
//!
//! All settings live in one file loaded at startup. Every field has a
//! default, so an empty document (or no file at all) yields a runnable
//! configuration.
//!
//! ## Example
//!
//! ```yaml
//! listen:
//!   host: "127.0.0.1"
//!   port: 8080
//!
//! store:
//!   backend: "redb"
//!   path: "bookshelf.redb"
//!
//! http:
//!   timeout_secs: 30
//!   max_body_kb: 64
//!
//! log:
//!   filter: "info"
//!   json: false
//! ```
//!
//! Two environment variables take part: `BOOKSHELF_CONFIG` names the file to
//! load, and `BOOKSHELF_DB` overrides `store.path`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "BOOKSHELF_CONFIG";

/// Environment variable overriding the store path.
pub const STORE_PATH_ENV: &str = "BOOKSHELF_DB";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    #[serde(default)]
    pub listen: ListenConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl ServiceConfig {
    /// Load from the environment: `BOOKSHELF_CONFIG` names a file, otherwise
    /// defaults apply. `BOOKSHELF_DB` then overrides the store path.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(path) = env::var_os(STORE_PATH_ENV) {
            config.store.path = Some(PathBuf::from(path));
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.http.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

/// Listener address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Redb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default = "default_store_path")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Redb && self.path.is_none() {
            return Err(ConfigError::Validation(
                "store.path is required when backend is 'redb'".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

/// Request-handling limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_body_kb")]
    pub max_body_kb: usize,
}

impl HttpConfig {
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_kb * 1024
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.max_body_kb == 0 {
            return Err(ConfigError::Validation(
                "http.max_body_kb must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_body_kb: default_max_body_kb(),
        }
    }
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// Helper functions for serde defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_backend() -> StoreBackend {
    StoreBackend::Redb
}
fn default_store_path() -> Option<PathBuf> {
    Some(PathBuf::from("bookshelf.redb"))
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_body_kb() -> usize {
    64
}
fn default_log_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
listen:
  host: "0.0.0.0"
  port: 9090
store:
  backend: "memory"
log:
  filter: "bookshelf=debug"
"#;

        let config = ServiceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.listen.host, "0.0.0.0");
        assert_eq!(config.listen.port, 9090);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.log.filter, "bookshelf=debug");
        // Untouched sections keep their defaults.
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
listen:
  port: 3000
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.listen.port, 3000);
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Redb);
        assert_eq!(config.store.path, Some(PathBuf::from("bookshelf.redb")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ServiceConfig::from_yaml("{}").unwrap();
        assert_eq!(config.listen.port, 8080);
        assert_eq!(config.http.max_body_kb, 64);
    }

    #[test]
    fn test_redb_backend_requires_path() {
        let yaml = r#"
store:
  backend: "redb"
  path: null
"#;

        let result = ServiceConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("store.path is required")
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let yaml = r#"
store:
  backend: "rocksdb"
"#;

        assert!(matches!(
            ServiceConfig::from_yaml(yaml),
            Err(ConfigError::YamlParse(_))
        ));
    }

    #[test]
    fn test_http_validation() {
        let yaml = r#"
http:
  timeout_secs: 0
"#;

        let result = ServiceConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("timeout_secs must be >= 1")
        );
    }

    #[test]
    fn test_log_filter_validation() {
        let yaml = r#"
log:
  filter: "   "
"#;

        let result = ServiceConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("log.filter"));
    }

    #[test]
    fn test_full_yaml_roundtrip() {
        let yaml = r#"
listen:
  host: "127.0.0.1"
  port: 8080

store:
  backend: "redb"
  path: "/var/lib/bookshelf/books.redb"

http:
  timeout_secs: 10
  max_body_kb: 16

log:
  filter: "info,bookshelf=debug"
  json: true
"#;

        let config = ServiceConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.listen.port, 8080);
        assert_eq!(
            config.store.path,
            Some(PathBuf::from("/var/lib/bookshelf/books.redb"))
        );
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.max_body_bytes(), 16 * 1024);
        assert!(config.log.json);
    }
}
