//! Concurrent fan-out over the probe set

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use crate::{
    errors::{run_probe, StatusError},
    network::{BrokerClient, ChainHeadSource},
    probes::{
        BrokerProbe, DatabaseProbe, IndexerProbe, PriceFreshnessProbe, RelayBacklogProbe,
        RpcHeadProbe, SelfProbe, ServiceProbe,
    },
    storage::StatusStore,
    types::{StatusSnapshot, ThresholdConfig},
};
use super::Clock;

/// External dependencies the standard probe set inspects.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn StatusStore>,
    pub broker: Option<Arc<dyn BrokerClient>>,
    pub chain_head: Option<Arc<dyn ChainHeadSource>>,
    pub stream_key: String,
}

/// Stateless: each run depends only on current dependency state and thresholds.
pub struct StatusAggregator {
    probes: Vec<Arc<dyn ServiceProbe>>,
    thresholds: ThresholdConfig,
    clock: Arc<dyn Clock>,
}

impl StatusAggregator {
    /// Probes are reported in the order given.
    pub fn new(
        probes: Vec<Arc<dyn ServiceProbe>>,
        thresholds: ThresholdConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { probes, thresholds, clock }
    }

    /// api, postgres, redis, rpc, indexer, prices, relay.
    pub fn standard(
        collaborators: Collaborators,
        thresholds: ThresholdConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let Collaborators { store, broker, chain_head, stream_key } = collaborators;
        let probes: Vec<Arc<dyn ServiceProbe>> = vec![
            Arc::new(SelfProbe),
            Arc::new(DatabaseProbe::new(store.clone())),
            Arc::new(BrokerProbe::new(broker, stream_key)),
            Arc::new(RpcHeadProbe::new(chain_head.clone())),
            Arc::new(IndexerProbe::new(store.clone(), chain_head, thresholds, clock.clone())),
            Arc::new(PriceFreshnessProbe::new(store.clone(), thresholds, clock.clone())),
            Arc::new(RelayBacklogProbe::new(store, thresholds)),
        ];
        Self::new(probes, thresholds, clock)
    }

    pub fn service_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds
    }

    pub fn placeholder(&self) -> StatusSnapshot {
        StatusSnapshot::placeholder(self.clock.unix_now(), self.thresholds, self.service_names())
    }

    /// Run every probe concurrently. Wall-clock time is bounded by the slowest
    /// probe timeout, and every probe yields exactly one entry.
    pub async fn aggregate(&self) -> StatusSnapshot {
        let started = Instant::now();
        let runs = join_all(self.probes.iter().map(|probe| run_probe(probe.as_ref()))).await;

        let failed: Vec<String> = runs
            .iter()
            .filter(|run| run.failed())
            .map(|run| run.result.name.clone())
            .collect();
        if !failed.is_empty() {
            warn!(error = %StatusError::AggregationPartialFailure { failed }, "Status degraded");
        }

        let snapshot = StatusSnapshot {
            generated_at: self.clock.unix_now(),
            thresholds: self.thresholds,
            services: runs.into_iter().map(|run| run.result).collect(),
            stale: false,
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            overall = %snapshot.overall(),
            "Status aggregation complete"
        );
        snapshot
    }
}
