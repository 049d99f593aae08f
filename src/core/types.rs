//! Domain types shared by the collector, builder and publisher.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Namespace every batch is published under.
pub const NAMESPACE: &str = "Memory";

/// The fixed set of memory counters published on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    /// Memory used by kernel block buffers.
    Buffers,
    /// Page cache.
    Cached,
    /// Completely unused memory.
    Free,
    /// Free memory plus reclaimable buffers and cache.
    FreeTotal,
}

impl MetricName {
    /// All counters, in publish order.
    pub const ALL: [MetricName; 4] = [
        MetricName::Buffers,
        MetricName::Cached,
        MetricName::Free,
        MetricName::FreeTotal,
    ];

    /// Wire name of the metric.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::Buffers => "Buffers",
            MetricName::Cached => "Cached",
            MetricName::Free => "Free",
            MetricName::FreeTotal => "FreeTotal",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Point-in-time memory counters, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemorySnapshot {
    /// Kernel block buffers.
    pub buffers: u64,
    /// Page cache.
    pub cached: u64,
    /// Unused memory (`MemFree`).
    pub free: u64,
    /// `free + buffers + cached`.
    pub free_total: u64,
}

impl MemorySnapshot {
    /// Byte count for `name`.
    pub fn get(&self, name: MetricName) -> u64 {
        match name {
            MetricName::Buffers => self.buffers,
            MetricName::Cached => self.cached,
            MetricName::Free => self.free,
            MetricName::FreeTotal => self.free_total,
        }
    }
}

/// A named tag identifying where a metric came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    /// Dimension key, e.g. `InstanceID`.
    pub name: String,
    /// Dimension value.
    pub value: String,
}

impl Dimension {
    /// Create a dimension from any string-like pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Identity of the host as reported by the instance metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentity {
    /// Region the instance runs in, e.g. `us-east-1`.
    pub region: String,
    /// Instance id, e.g. `i-0abc`.
    pub instance_id: String,
    /// Instance type, e.g. `m5.large`.
    pub instance_type: String,
}

/// Dimension set shared by every record for the lifetime of the process.
///
/// Cloning is a reference-count bump, so all records of a batch point at the
/// same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dimensions(Arc<[Dimension]>);

impl Dimensions {
    /// Builds the `InstanceID`, `InstanceType`, `Hostname` set.
    pub fn for_host(identity: &InstanceIdentity, hostname: &str) -> Self {
        Self::from(vec![
            Dimension::new("InstanceID", identity.instance_id.as_str()),
            Dimension::new("InstanceType", identity.instance_type.as_str()),
            Dimension::new("Hostname", hostname),
        ])
    }

    /// The dimensions in attach order.
    pub fn as_slice(&self) -> &[Dimension] {
        &self.0
    }

    /// True when both handles share one allocation.
    pub fn ptr_eq(&self, other: &Dimensions) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<Dimension>> for Dimensions {
    fn from(dims: Vec<Dimension>) -> Self {
        Self(dims.into())
    }
}

/// Unit attached to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    /// Plain byte count.
    Bytes,
}

/// One data point ready to publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    /// Which counter this is.
    pub metric_name: MetricName,
    /// Counter value in bytes.
    pub value: f64,
    /// Always [`Unit::Bytes`].
    pub unit: Unit,
    /// Wall-clock time of the tick that produced the record.
    pub timestamp: DateTime<Utc>,
    /// Host dimensions, shared across records.
    pub dimensions: Dimensions,
}

/// Records produced by one tick, under a namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishBatch {
    /// Metric namespace, always [`NAMESPACE`].
    pub namespace: &'static str,
    /// Records in publish order.
    pub metric_data: Vec<MetricRecord>,
}

impl PublishBatch {
    /// Batch in the fixed [`NAMESPACE`].
    pub fn new(metric_data: Vec<MetricRecord>) -> Self {
        Self {
            namespace: NAMESPACE,
            metric_data,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.metric_data.len()
    }

    /// True if the batch has no records.
    pub fn is_empty(&self) -> bool {
        self.metric_data.is_empty()
    }
}
