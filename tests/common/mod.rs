//! Common test doubles for the agent's collaborators.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use mempush_lib::collector::MemoryStatsSource;
use mempush_lib::core::{InstanceIdentity, MempushError, MemorySnapshot, PublishBatch, Result};
use mempush_lib::identity::{HostnameSource, IdentityResolver};
use mempush_lib::publisher::MetricsSink;

/// The snapshot used by most scenarios.
pub fn sample_snapshot() -> MemorySnapshot {
    MemorySnapshot {
        buffers: 1000,
        cached: 2000,
        free: 500,
        free_total: 1500,
    }
}

pub fn sample_identity() -> InstanceIdentity {
    InstanceIdentity {
        region: "eu-west-1".to_string(),
        instance_id: "i-1".to_string(),
        instance_type: "t3.micro".to_string(),
    }
}

/// Memory source that replays scripted results, then repeats the fallback.
pub struct ScriptedMemory {
    script: Mutex<VecDeque<Result<MemorySnapshot>>>,
    fallback: MemorySnapshot,
    delay: Duration,
    refreshes: AtomicUsize,
}

impl ScriptedMemory {
    pub fn steady(snapshot: MemorySnapshot) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: snapshot,
            delay: Duration::ZERO,
            refreshes: AtomicUsize::new(0),
        }
    }

    /// Make every refresh take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn then(self, result: Result<MemorySnapshot>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MemoryStatsSource for ScriptedMemory {
    async fn refresh(&self) -> Result<MemorySnapshot> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback))
    }
}

/// Sink that records batches, optionally taking time or failing.
#[derive(Default)]
pub struct RecordingSink {
    delay: Duration,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delivered: Mutex<Vec<PublishBatch>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the n-th call (1-based) with a network error.
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<PublishBatch> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MetricsSink for RecordingSink {
    async fn put_metric_data(&self, batch: &PublishBatch) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        // Decrements even when the future is dropped by a timeout.
        struct InFlight<'a>(&'a AtomicUsize);
        impl Drop for InFlight<'_> {
            fn drop(&mut self) {
                self.0.fetch_sub(1, Ordering::SeqCst);
            }
        }
        let _guard = InFlight(&self.in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(MempushError::network("connection reset by peer"));
        }
        self.delivered.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

pub struct FixedHostname(pub &'static str);

impl HostnameSource for FixedHostname {
    fn hostname(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Hostname source whose lookup always fails.
pub struct FailingHostname(pub &'static str);

impl HostnameSource for FailingHostname {
    fn hostname(&self) -> Result<String> {
        Err(MempushError::Hostname(self.0.to_string()))
    }
}

/// Identity resolver returning a fixed answer and counting calls.
pub struct StaticIdentity {
    result: std::result::Result<InstanceIdentity, String>,
    calls: AtomicUsize,
}

impl StaticIdentity {
    pub fn ok(identity: InstanceIdentity) -> Self {
        Self {
            result: Ok(identity),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self) -> Result<InstanceIdentity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(MempushError::identity)
    }
}
