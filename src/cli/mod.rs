//! Command-line interface for mempush.
//!
//! Run `mempush --endpoint <url>` on an instance and leave it to its
//! supervisor; it publishes memory metrics every minute until something fails.

use crate::core::{Config, ConfigBuilder, LogLevel, MempushError, Result};
use crate::Application;
use clap::Parser;
use std::path::PathBuf;

/// Push host memory statistics as custom metrics.
#[derive(Parser, Debug)]
#[command(name = "mempush")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Ingestion endpoint URL
    #[arg(long, env = "MEMPUSH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token for the ingestion endpoint
    #[arg(long, env = "MEMPUSH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Metadata service base URL
    #[arg(long, env = "MEMPUSH_IMDS_ENDPOINT")]
    pub imds_endpoint: Option<String>,

    /// Path of the kernel meminfo file
    #[arg(long, env = "MEMPUSH_MEMINFO_PATH")]
    pub meminfo_path: Option<PathBuf>,

    /// Configuration file path (default: ~/.config/mempush/config.yaml)
    #[arg(short, long, env = "MEMPUSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overriding the config file (`RUST_LOG` still wins)
    #[arg(long, env = "MEMPUSH_LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging
    #[arg(short, long, env = "MEMPUSH_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and environment variables (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    ///
    /// Also returns the config file that was read, if any. Nothing is logged
    /// here since logging is configured from the result.
    pub async fn load_config(&self) -> Result<(Config, Option<PathBuf>)> {
        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            let default_path = dirs::config_dir()
                .map(|d| d.join("mempush").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("~/.config/mempush/config.yaml"));

            if default_path.exists() {
                default_path
            } else {
                return Ok((self.build_config_from_args(builder)?, None));
            }
        };

        let loaded = match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                Some(config_path)
            },
            Err(e) if self.config.is_some() => {
                return Err(MempushError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => None,
        };

        Ok((self.build_config_from_args(builder)?, loaded))
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.as_str());
        }
        if let Some(endpoint) = &self.imds_endpoint {
            builder = builder.imds_endpoint(endpoint.as_str());
        }
        if let Some(path) = &self.meminfo_path {
            builder = builder.meminfo_path(path.clone());
        }
        if let Some(level) = self.log_level {
            builder = builder.log_level(level);
        }

        builder.debug(self.debug).build()
    }

    /// Default filter when `RUST_LOG` is unset: `--debug`, else the
    /// configured level (which `--log-level` has already overridden).
    fn default_directive(&self, config: &Config) -> &'static str {
        if self.debug {
            LogLevel::Debug.as_str()
        } else {
            config.logging.level.as_str()
        }
    }

    /// Initialize logging. `RUST_LOG` wins over everything else.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive(config)));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.logging.structured)
            .with_thread_ids(config.logging.structured)
            .with_line_number(config.logging.structured)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| MempushError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the mempush agent. Returns only on error or after `--check-config`.
pub async fn execute(cli: Cli) -> Result<()> {
    let (config, loaded_from) = cli.load_config().await?;
    cli.init_logging(&config)?;

    match &loaded_from {
        Some(path) => tracing::info!("Loaded configuration from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults and arguments"),
    }

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Ingestion endpoint: {}", config.ingestion.endpoint);
        println!("  Metadata endpoint: {}", config.identity.imds_endpoint);
        println!("  Meminfo path: {}", config.collector.meminfo_path.display());
        return Ok(());
    }

    tracing::info!("Starting mempush {}", env!("CARGO_PKG_VERSION"));
    let app = Application::new(&config)?;
    match app.run().await {
        Ok(never) => match never {},
        Err(e) => Err(e),
    }
}
