//! Core domain models, configuration and errors for mempush.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel};
pub use error::{MempushError, Result, Stage, StageExt};
pub use types::{
    Dimension, Dimensions, InstanceIdentity, MemorySnapshot, MetricName, MetricRecord,
    PublishBatch, Unit, NAMESPACE,
};
