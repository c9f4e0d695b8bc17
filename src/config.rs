//! Configuration module for linkdrop.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ShareError};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/linkdrop.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the blob namespace.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Base URL under which signed blob links are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_storage_path() -> String {
    "data/blobs".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

fn default_public_base_url() -> String {
    "http://localhost:8080/blobs".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl StorageConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// Signed link configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    /// Validity window of issued links in seconds.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
    /// Secret used to sign links. Generated per process when empty.
    #[serde(default)]
    pub signing_secret: String,
}

fn default_validity_secs() -> u64 {
    3600 // 1 hour
}

/// Longest accepted link validity (7 days).
pub const MAX_LINK_VALIDITY_SECS: u64 = 7 * 24 * 3600;

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            validity_secs: default_validity_secs(),
            signing_secret: String::new(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Timezone for displaying dates (e.g., "Europe/Berlin", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/linkdrop.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Signed link configuration.
    #[serde(default)]
    pub links: LinksConfig,
    /// Display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `LINKDROP_SIGNING_SECRET`: Override the link signing secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("LINKDROP_SIGNING_SECRET") {
            if !secret.is_empty() {
                self.links.signing_secret = secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.links.validity_secs == 0 {
            return Err(ShareError::Config(
                "links.validity_secs must be greater than 0".to_string(),
            ));
        }
        if self.links.validity_secs > MAX_LINK_VALIDITY_SECS {
            return Err(ShareError::Config(format!(
                "links.validity_secs must be at most {MAX_LINK_VALIDITY_SECS}"
            )));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(ShareError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if url::Url::parse(&self.storage.public_base_url).is_err() {
            return Err(ShareError::Config(format!(
                "storage.public_base_url is not a valid URL: {}",
                self.storage.public_base_url
            )));
        }
        if self.display.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ShareError::Config(format!(
                "unknown timezone: {}",
                self.display.timezone
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/linkdrop.db");
        assert_eq!(config.storage.path, "data/blobs");
        assert_eq!(config.storage.max_upload_size_mb, 50);
        assert_eq!(config.storage.max_upload_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.storage.public_base_url, "http://localhost:8080/blobs");
        assert_eq!(config.links.validity_secs, 3600);
        assert!(config.links.signing_secret.is_empty());
        assert_eq!(config.display.timezone, "UTC");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/linkdrop.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "custom/db.sqlite"

[storage]
path = "custom/blobs"
max_upload_size_mb = 5
public_base_url = "https://files.example.com/b"

[links]
validity_secs = 600
signing_secret = "s3cret"

[display]
timezone = "Europe/Berlin"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.storage.path, "custom/blobs");
        assert_eq!(config.storage.max_upload_size_mb, 5);
        assert_eq!(config.storage.public_base_url, "https://files.example.com/b");
        assert_eq!(config.links.validity_secs, 600);
        assert_eq!(config.links.signing_secret, "s3cret");
        assert_eq!(config.display.timezone, "Europe/Berlin");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[links]
validity_secs = 120
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.links.validity_secs, 120);
        assert_eq!(config.database.path, "data/linkdrop.db");
        assert_eq!(config.storage.max_upload_size_mb, 50);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[links\nvalidity_secs = ");
        assert!(matches!(result, Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_zero_validity() {
        let mut config = Config::default();
        config.links.validity_secs = 0;
        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_validity_upper_bound() {
        let mut config = Config::default();
        config.links.validity_secs = MAX_LINK_VALIDITY_SECS;
        assert!(config.validate().is_ok());

        config.links.validity_secs = 10_000_000_000_000;
        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_zero_upload_limit() {
        let mut config = Config::default();
        config.storage.max_upload_size_mb = 0;
        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_bad_base_url() {
        let mut config = Config::default();
        config.storage.public_base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_validate_bad_timezone() {
        let mut config = Config::default();
        config.display.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(ShareError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/linkdrop.toml");
        assert!(matches!(result, Err(ShareError::Io(_))));
    }
}
