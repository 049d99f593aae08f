//! Configuration management for mempush.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI overrides (applied by the CLI)
//! - Validation and defaults
//!
//! The sampling interval and publish timeout are deliberately absent: they
//! are fixed constants of the sampling loop.

use crate::core::{MempushError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for mempush
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ingestion endpoint configuration
    pub ingestion: IngestionConfig,
    /// Instance identity lookup configuration
    pub identity: IdentityConfig,
    /// Memory collector configuration
    pub collector: CollectorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Where and how metrics are published
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// URL batches are POSTed to. Required; there is no default.
    pub endpoint: String,
    /// Bearer token sent with every request
    pub api_key: Option<String>,
}

/// Instance metadata service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the metadata service
    pub imds_endpoint: String,
    /// Bound on each metadata request at startup
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Memory counter source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Path of the kernel meminfo file
    pub meminfo_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include targets, thread ids and line numbers
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-request detail
    Trace,
    /// Per-tick detail
    Debug,
    /// Startup and termination
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            imds_endpoint: "http://169.254.169.254".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            meminfo_path: PathBuf::from("/proc/meminfo"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.endpoint.trim().is_empty() {
            return Err(MempushError::config(
                "ingestion.endpoint is required (set --endpoint, MEMPUSH_ENDPOINT or the config file)",
            ));
        }
        Self::parse_http_url("ingestion.endpoint", &self.ingestion.endpoint)?;
        Self::parse_http_url("identity.imds_endpoint", &self.identity.imds_endpoint)?;

        if let Some(key) = &self.ingestion.api_key {
            if key.trim().is_empty() {
                return Err(MempushError::config("ingestion.api_key must not be empty when set"));
            }
        }

        if self.identity.timeout.is_zero() {
            return Err(MempushError::config("identity.timeout must be greater than 0"));
        }

        if self.collector.meminfo_path.as_os_str().is_empty() {
            return Err(MempushError::config("collector.meminfo_path must not be empty"));
        }

        Ok(())
    }

    /// Parsed ingestion endpoint
    pub fn ingestion_url(&self) -> Result<Url> {
        Self::parse_http_url("ingestion.endpoint", &self.ingestion.endpoint)
    }

    /// Parsed metadata service base URL
    pub fn imds_url(&self) -> Result<Url> {
        Self::parse_http_url("identity.imds_endpoint", &self.identity.imds_endpoint)
    }

    fn parse_http_url(field: &str, raw: &str) -> Result<Url> {
        let url = Url::parse(raw)
            .map_err(|e| MempushError::config(format!("Invalid {field} '{raw}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(MempushError::config(format!(
                "{field} must use http or https, got '{scheme}'"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

/// Configuration builder for programmatic construction
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| MempushError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set ingestion endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.ingestion.endpoint = endpoint.into();
        self
    }

    /// Set ingestion API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.ingestion.api_key = Some(key.into());
        self
    }

    /// Set metadata service base URL
    pub fn imds_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.identity.imds_endpoint = endpoint.into();
        self
    }

    /// Set meminfo path
    pub fn meminfo_path(mut self, path: PathBuf) -> Self {
        self.config.collector.meminfo_path = path;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
