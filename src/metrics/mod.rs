//! Metric record construction.
//!
//! Turns a memory snapshot into the records of one publish batch. Building is
//! pure: identical inputs always give an identical, identically ordered batch.

use crate::core::{Dimensions, MemorySnapshot, MetricName, MetricRecord, Unit};
use chrono::{DateTime, Utc};

/// One record per counter, in [`MetricName::ALL`] order, all sharing `now`
/// and `dims`.
pub fn build(
    snapshot: &MemorySnapshot,
    now: DateTime<Utc>,
    dims: &Dimensions,
) -> Vec<MetricRecord> {
    MetricName::ALL
        .iter()
        .map(|&name| MetricRecord {
            metric_name: name,
            value: snapshot.get(name) as f64,
            unit: Unit::Bytes,
            timestamp: now,
            dimensions: dims.clone(),
        })
        .collect()
}
