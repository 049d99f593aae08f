//! The periodic sample-and-publish loop.
//!
//! Every [`SAMPLE_INTERVAL`] the loop refreshes the memory snapshot, builds a
//! batch and publishes it within [`PUBLISH_TIMEOUT`]. Ticks run inline on a
//! single task, so a tick always finishes before the next one starts and two
//! publishes never overlap.
//!
//! Any error ends the loop. There is no retry and no skipping of a failed
//! tick: the process is expected to be restarted by its supervisor.

use crate::collector::MemoryStatsSource;
use crate::core::{Dimensions, PublishBatch, Result, Stage, StageExt};
use crate::metrics;
use crate::publisher::{BoundedPublisher, PUBLISH_TIMEOUT};
use chrono::Utc;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Time between ticks.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

/// Drives collection and publishing until the first failure.
pub struct SamplingLoop {
    source: Arc<dyn MemoryStatsSource>,
    publisher: BoundedPublisher,
    dimensions: Dimensions,
    ticks: u64,
}

impl SamplingLoop {
    /// `dimensions` are attached unchanged to every record for the life of
    /// the loop.
    pub fn new(
        source: Arc<dyn MemoryStatsSource>,
        publisher: BoundedPublisher,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            source,
            publisher,
            dimensions,
            ticks: 0,
        }
    }

    /// Dimensions attached to every record.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Number of ticks that published successfully.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one tick: refresh, timestamp, build, publish.
    pub async fn tick(&mut self) -> Result<()> {
        let snapshot = self.source.refresh().await.stage(Stage::MemoryUpdate)?;
        let now = Utc::now();
        let batch = PublishBatch::new(metrics::build(&snapshot, now, &self.dimensions));

        tracing::debug!(
            tick = self.ticks + 1,
            records = batch.len(),
            free_total = snapshot.free_total,
            "publishing memory metrics"
        );

        self.publisher
            .publish(&batch, PUBLISH_TIMEOUT)
            .await
            .stage(Stage::Publish)?;

        self.ticks += 1;
        Ok(())
    }

    /// Tick forever. Only returns when a tick fails; the failure is logged
    /// here once and then handed back to the caller.
    ///
    /// The first tick fires one interval after the call. If a tick overruns
    /// the interval, the missed fire happens immediately afterwards and later
    /// fires stay on the original schedule; missed fires are never queued.
    pub async fn run(mut self) -> Result<Infallible> {
        let mut ticker = interval_at(Instant::now() + SAMPLE_INTERVAL, SAMPLE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = SAMPLE_INTERVAL.as_secs(),
            timeout_secs = PUBLISH_TIMEOUT.as_secs(),
            "sampling loop started"
        );

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                tracing::error!(
                    category = e.category(),
                    ticks = self.ticks,
                    "sampling loop terminated: {}",
                    e
                );
                return Err(e);
            }
        }
    }
}

impl std::fmt::Debug for SamplingLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingLoop")
            .field("dimensions", &self.dimensions)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}
