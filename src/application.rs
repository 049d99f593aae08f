//! Startup wiring for the mempush agent.

use crate::collector::{MemoryStatsSource, ProcMeminfo};
use crate::core::{Config, Dimensions, InstanceIdentity, Result, Stage, StageExt};
use crate::identity::{HostnameSource, IdentityResolver, ImdsResolver, SystemHostname};
use crate::publisher::{BoundedPublisher, HttpSink, MetricsSink};
use crate::sampling::SamplingLoop;
use std::convert::Infallible;
use std::sync::Arc;

/// Builds the metrics sink for the resolved instance.
type ConnectSink = Box<dyn Fn(&InstanceIdentity) -> Result<Arc<dyn MetricsSink>> + Send + Sync>;

/// Owns the collaborators of one agent run.
///
/// Every dependency is passed in explicitly, so tests can swap any of them
/// for a double.
pub struct Application {
    hostname: Arc<dyn HostnameSource>,
    identity: Arc<dyn IdentityResolver>,
    memory: Arc<dyn MemoryStatsSource>,
    connect: ConnectSink,
}

impl Application {
    /// Create the production collaborators from configuration.
    ///
    /// The ingestion client needs the instance region, so it is only built
    /// by [`prepare`](Self::prepare).
    pub fn new(config: &Config) -> Result<Self> {
        let resolver =
            ImdsResolver::new(config.imds_url()?, config.identity.timeout).stage(Stage::Identity)?;
        let endpoint = config.ingestion_url()?;
        let api_key = config.ingestion.api_key.clone();

        Ok(Self {
            hostname: Arc::new(SystemHostname),
            identity: Arc::new(resolver),
            memory: Arc::new(ProcMeminfo::new(config.collector.meminfo_path.clone())),
            connect: Box::new(
                move |identity: &InstanceIdentity| -> Result<Arc<dyn MetricsSink>> {
                    let sink =
                        HttpSink::new(endpoint.clone(), api_key.as_deref(), &identity.region)?;
                    Ok(Arc::new(sink))
                },
            ),
        })
    }

    /// Wire the agent from ready-made collaborators. `sink` is used as is,
    /// whatever region the identity reports.
    pub fn with_collaborators(
        hostname: Arc<dyn HostnameSource>,
        identity: Arc<dyn IdentityResolver>,
        memory: Arc<dyn MemoryStatsSource>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            hostname,
            identity,
            memory,
            connect: Box::new(move |_: &InstanceIdentity| -> Result<Arc<dyn MetricsSink>> {
                Ok(Arc::clone(&sink))
            }),
        }
    }

    /// Resolve hostname and identity once, connect the sink and build the
    /// loop around them. Any failure here happens before the first tick.
    pub async fn prepare(&self) -> Result<SamplingLoop> {
        let hostname = self.hostname.hostname().stage(Stage::Hostname)?;
        let identity = self.identity.resolve().await.stage(Stage::Identity)?;

        tracing::info!(
            region = %identity.region,
            instance_id = %identity.instance_id,
            instance_type = %identity.instance_type,
            hostname = %hostname,
            "resolved host identity"
        );

        let sink = (self.connect)(&identity).stage(Stage::Client)?;

        Ok(SamplingLoop::new(
            Arc::clone(&self.memory),
            BoundedPublisher::new(sink),
            Dimensions::for_host(&identity, &hostname),
        ))
    }

    /// Prepare and run the loop. Only returns on failure.
    pub async fn run(self) -> Result<Infallible> {
        self.prepare().await?.run().await
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application").finish_non_exhaustive()
    }
}
