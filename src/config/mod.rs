//! Configuration management for export-table
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Prefix shared by every environment override.
const ENV_PREFIX: &str = "EXPORT_TABLE_";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// MySQL server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Export loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Rows fetched per page query
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Show a progress spinner on a terminal
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_port() -> u16 {
    3306
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_page_size() -> u64 {
    10_000
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl ConnectionConfig {
    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration with file and environment layers applied
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// only if present.
    ///
    /// # Arguments
    /// * `path` - Optional explicit configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Merged configuration or error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Self::default_path();
                if default.is_file() {
                    tracing::debug!("Loading config from {}", default.display());
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `EXPORT_TABLE_*` overrides
    ///
    /// The lookup is injected so tests do not have to touch the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("PORT") {
            self.connection.port = parse_field("connection.port", &v)?;
        }
        if let Some(v) = get("CONNECT_TIMEOUT") {
            self.connection.connect_timeout = parse_field("connection.connect_timeout", &v)?;
        }
        if let Some(v) = get("PAGE_SIZE") {
            self.export.page_size = parse_field("export.page_size", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = LogLevel::parse(&v).ok_or_else(|| ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".export-table")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.export.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.page_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.connection.connect_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection.connect_timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.export.page_size, 10_000);
        assert_eq!(config.connection.port, 3306);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [export]
            page_size = 500

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.export.page_size, 500);
        assert!(config.export.progress);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.connection, ConnectionConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[export]\npage_size = \"many\"").unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[connection]\nport = 3307\n").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.connection.port, 3307);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("EXPORT_TABLE_PAGE_SIZE", "250"),
            ("EXPORT_TABLE_PORT", "3310"),
            ("EXPORT_TABLE_LOG_LEVEL", "TRACE"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.export.page_size, 250);
        assert_eq!(config.connection.port, 3310);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env(|k| (k == "EXPORT_TABLE_PAGE_SIZE").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("export.page_size"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = Config::default();
        config.export.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout() {
        let config = Config::default();
        assert_eq!(config.connection.connect_timeout(), Duration::from_secs(30));
    }
}
