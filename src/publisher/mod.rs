//! Deadline-bounded publishing of metric batches.
//!
//! A [`MetricsSink`] performs exactly one request per call. The
//! [`BoundedPublisher`] puts a wall-clock deadline around that call: when the
//! deadline passes the in-flight future is dropped, which cancels the request
//! and releases its connection. Nothing is retried or buffered, so a failed
//! publish loses that tick's data.

use crate::core::{MempushError, PublishBatch, Result};
use std::sync::Arc;
use std::time::Duration;

pub mod http;

pub use http::HttpSink;

/// Per-call deadline for a publish.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// The remote metrics ingestion service.
#[async_trait::async_trait]
pub trait MetricsSink: Send + Sync {
    /// Send one batch. A single outbound request, no retries.
    async fn put_metric_data(&self, batch: &PublishBatch) -> Result<()>;
}

/// Sends batches through a [`MetricsSink`] within a deadline.
pub struct BoundedPublisher {
    sink: Arc<dyn MetricsSink>,
}

impl BoundedPublisher {
    /// Wrap `sink`; the deadline is chosen per call.
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self { sink }
    }

    /// Publish `batch`, failing with [`MempushError::Timeout`] if the sink has
    /// not acknowledged it within `timeout`.
    pub async fn publish(&self, batch: &PublishBatch, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.sink.put_metric_data(batch)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(MempushError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

impl std::fmt::Debug for BoundedPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedPublisher").finish_non_exhaustive()
    }
}
