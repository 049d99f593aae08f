//! Memory counter sources.
//!
//! The sampling loop asks a [`MemoryStatsSource`] for a fresh snapshot on
//! every tick; nothing is cached between ticks.

use crate::core::{MemorySnapshot, Result};

pub mod meminfo;

pub use meminfo::ProcMeminfo;

/// Produces point-in-time memory counters.
#[async_trait::async_trait]
pub trait MemoryStatsSource: Send + Sync {
    /// Read the counters again and return them as a new snapshot.
    async fn refresh(&self) -> Result<MemorySnapshot>;
}
