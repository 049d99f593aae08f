//! Configuration system tests.

use std::path::PathBuf;
use std::time::Duration;

use mempush_lib::core::{Config, ConfigBuilder, LogLevel};

const ENDPOINT: &str = "https://metrics.internal/v1/put";

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.ingestion.endpoint.is_empty());
    assert_eq!(config.identity.imds_endpoint, "http://169.254.169.254");
    assert_eq!(config.identity.timeout, Duration::from_secs(5));
    assert_eq!(config.collector.meminfo_path, PathBuf::from("/proc/meminfo"));
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.ingestion.api_key.is_none());
}

#[test]
fn test_endpoint_is_required() {
    let err = ConfigBuilder::new().build().unwrap_err();
    assert_eq!(err.category(), "config");
    assert!(err.to_string().contains("ingestion.endpoint is required"));

    // A config file that never mentions the endpoint is rejected too.
    let err = ConfigBuilder::new()
        .from_yaml("logging:\n  level: warn\n")
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("ingestion.endpoint is required"));

    assert!(ConfigBuilder::new().endpoint("   ").build().is_err());
    assert!(ConfigBuilder::new().endpoint(ENDPOINT).build().is_ok());
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .endpoint("https://metrics.internal/v1/put")
        .api_key("abc")
        .imds_endpoint("http://127.0.0.1:1338")
        .meminfo_path(PathBuf::from("/tmp/meminfo"))
        .debug(true)
        .build()
        .unwrap();

    assert_eq!(config.ingestion_url().unwrap().host_str(), Some("metrics.internal"));
    assert_eq!(config.imds_url().unwrap().port(), Some(1338));
    assert_eq!(config.ingestion.api_key.as_deref(), Some("abc"));
    assert!(config.debug);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
ingestion:
  endpoint: "https://metrics.internal/v1/put"
identity:
  imds_endpoint: "http://localhost:1338"
  timeout: 1500ms
collector:
  meminfo_path: /host/proc/meminfo
logging:
  level: warn
  structured: true
"#;

    let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();

    assert_eq!(config.identity.timeout, Duration::from_millis(1500));
    assert_eq!(config.collector.meminfo_path, PathBuf::from("/host/proc/meminfo"));
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert!(config.logging.structured);
}

#[test]
fn test_config_validation() {
    let valid = || ConfigBuilder::new().endpoint(ENDPOINT);
    assert!(ConfigBuilder::new().endpoint("unix:///var/run/metrics.sock").build().is_err());
    assert!(valid().imds_endpoint("169.254.169.254").build().is_err());
    assert!(valid().meminfo_path(PathBuf::new()).build().is_err());
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = ConfigBuilder::new().from_yaml("logging: [unclosed").unwrap_err();
    assert_eq!(err.category(), "config");
}

#[test]
fn test_log_level_override() {
    let config = ConfigBuilder::new()
        .from_yaml("ingestion:\n  endpoint: https://metrics.internal/v1/put\nlogging:\n  level: warn\n")
        .unwrap()
        .log_level(LogLevel::Trace)
        .build()
        .unwrap();
    assert_eq!(config.logging.level, LogLevel::Trace);
}

#[test]
fn test_unknown_log_level_rejected() {
    assert!(ConfigBuilder::new().from_yaml("logging:\n  level: loud\n").is_err());
}
