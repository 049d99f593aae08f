//! mempush - host memory metrics agent.
//!
//! mempush samples host memory counters once a minute and publishes them as
//! custom metrics, tagged with the instance id, instance type and hostname
//! of the machine it runs on.
//!
//! # Architecture
//!
//! - `collector`: memory counter sources (`/proc/meminfo`)
//! - `identity`: instance identity and hostname lookups, run once at startup
//! - `metrics`: turns a snapshot into metric records
//! - `publisher`: deadline-bounded delivery to the ingestion endpoint
//! - `sampling`: the fixed-interval loop tying it together
//! - `core`: domain types, configuration and errors
//! - `cli`: command-line interface
//!
//! The agent is fail-fast: the first error from a refresh or a publish ends
//! the process, which is meant to be restarted by a supervisor.
//!
//! # Example
//!
//! ```no_run
//! use mempush_lib::core::ConfigBuilder;
//! use mempush_lib::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new()
//!         .endpoint("https://monitoring.example.com/v1/metrics")
//!         .build()?;
//!     let app = Application::new(&config)?;
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod application;
pub mod cli;
pub mod collector;
pub mod core;
pub mod identity;
pub mod metrics;
pub mod publisher;
pub mod sampling;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, Result};
