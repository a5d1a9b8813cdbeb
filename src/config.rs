//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::checks::DEFAULT_MAX_INVALID_RECORDS;
use crate::history::ResultsBackend;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_mb() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_body_size(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Where uploads and history live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub results_backend: ResultsBackend,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("dqdash").to_string_lossy().to_string())
        .unwrap_or_else(|| "./dqdash_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            results_backend: ResultsBackend::default(),
        }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Directory holding uploaded CSV files
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_path().join("uploads")
    }
}

/// Validation run settings
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_invalid_records")]
    pub max_invalid_records: usize,
}

fn default_max_invalid_records() -> usize {
    DEFAULT_MAX_INVALID_RECORDS
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_invalid_records: default_max_invalid_records(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("dqdash").join("config.toml")),
            Some(PathBuf::from("/etc/dqdash/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparseable numbers are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("DQDASH_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(backend) = lookup("DQDASH_RESULTS_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.results_backend = b,
                Err(e) => tracing::warn!("Ignoring DQDASH_RESULTS_BACKEND: {}", e),
            }
        }

        if let Some(host) = lookup("DQDASH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DQDASH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Some(max) = lookup("DQDASH_MAX_INVALID_RECORDS") {
            if let Ok(m) = max.parse() {
                self.validation.max_invalid_records = m;
            }
        }

        if let Some(level) = lookup("DQDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DQDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    let data_dir = toml::Value::String(default_data_dir());
    format!(
        r#"# dqdash Configuration
#
# Environment variables override these settings:
# - DQDASH_DATA_DIR
# - DQDASH_RESULTS_BACKEND
# - DQDASH_HOST
# - DQDASH_PORT
# - DQDASH_MAX_INVALID_RECORDS
# - DQDASH_LOG_LEVEL
# - DQDASH_LOG_FORMAT

[server]
# API server host
host = "0.0.0.0"

# API server port
port = 8000

# Largest accepted dataset upload (MB)
max_upload_mb = 100

[storage]
# Directory for uploads and result history
data_dir = {data_dir}

# Result history backend: sqlite (persistent) or memory
results_backend = "sqlite"

[validation]
# Cap on invalid records kept per run
max_invalid_records = 1000

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.addr(), "0.0.0.0:8000");
        assert_eq!(config.storage.results_backend, ResultsBackend::Sqlite);
        assert_eq!(config.validation.max_invalid_records, 1000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.max_upload_mb, 100);
        assert_eq!(config.storage.data_dir, default_data_dir());
        assert!(!config.storage.data_dir.starts_with('~'));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("[storage]\nresults_backend = \"memory\"\n").unwrap();
        assert_eq!(config.storage.results_backend, ResultsBackend::Memory);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("DQDASH_DATA_DIR", "/srv/dq"),
            ("DQDASH_PORT", "9001"),
            ("DQDASH_MAX_INVALID_RECORDS", "not-a-number"),
            ("DQDASH_RESULTS_BACKEND", "memory"),
            ("DQDASH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/srv/dq");
        assert_eq!(config.storage.uploads_dir(), PathBuf::from("/srv/dq/uploads"));
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.validation.max_invalid_records, 1000);
        assert_eq!(config.storage.results_backend, ResultsBackend::Memory);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/dqdash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
