//! # Store Configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object
//! (or no file at all) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collections::refresh_tokens::{DEFAULT_TTL_DAYS, MAX_TTL_DAYS};
use crate::content::ContentPolicy;
use crate::observability::{LogConfig, LogLevel};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Document location (default: "database.json")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Refresh token lifetime in days (default: 60)
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,

    /// Post body rules
    #[serde(default)]
    pub content: ContentPolicy,

    /// Minimum log level (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.json")
}

fn default_refresh_token_ttl_days() -> i64 {
    DEFAULT_TTL_DAYS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            refresh_token_ttl_days: default_refresh_token_ttl_days(),
            content: ContentPolicy::default(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the store misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".into()));
        }

        if !(1..=MAX_TTL_DAYS).contains(&self.refresh_token_ttl_days) {
            return Err(ConfigError::Invalid(format!(
                "refresh_token_ttl_days must be between 1 and {}",
                MAX_TTL_DAYS
            )));
        }

        if self.content.max_chars == 0 {
            return Err(ConfigError::Invalid("content.max_chars must be > 0".into()));
        }

        for term in &self.content.redacted_terms {
            if term.is_empty() || term.contains(' ') || *term != term.to_lowercase() {
                return Err(ConfigError::Invalid(format!(
                    "redacted term '{}' must be a single lowercase word",
                    term
                )));
            }
        }

        if LogLevel::from_str(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Token lifetime, clamped to the range `validate` accepts
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days.clamp(1, MAX_TTL_DAYS))
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Info))
            .json_format(self.log_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.database_path, PathBuf::from("database.json"));
        assert_eq!(config.refresh_token_ttl(), Duration::days(60));
        assert_eq!(config.content.max_chars, 140);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chirpstore.json");
        fs::write(
            &path,
            r#"{"database_path": "/var/lib/chirps.json", "refresh_token_ttl_days": 7, "log_json": true}"#,
        )
        .unwrap();

        let config = StoreConfig::load(&path).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/chirps.json"));
        assert_eq!(config.refresh_token_ttl(), Duration::days(7));
        assert!(config.log_config().json_format);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_ttl = StoreConfig {
            refresh_token_ttl_days: 0,
            ..Default::default()
        };
        assert!(matches!(bad_ttl.validate(), Err(ConfigError::Invalid(_))));

        let mut bad_term = StoreConfig::default();
        bad_term.content.redacted_terms.push("Fornax".to_string());
        assert!(bad_term.validate().is_err());

        let bad_level = StoreConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_ttl_upper_bound() {
        let at_limit = StoreConfig {
            refresh_token_ttl_days: MAX_TTL_DAYS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        for days in [MAX_TTL_DAYS + 1, 1_000_000_000, i64::MAX] {
            let config = StoreConfig {
                refresh_token_ttl_days: days,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
            assert_eq!(config.refresh_token_ttl(), Duration::days(MAX_TTL_DAYS));
        }
    }

    #[test]
    fn test_load_rejects_huge_ttl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chirpstore.json");
        fs::write(&path, r#"{"refresh_token_ttl_days": 1000000000}"#).unwrap();

        assert!(matches!(StoreConfig::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = StoreConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
