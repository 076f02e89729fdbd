//! Request-facing status service: cached reads, background refresh, forced compute

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;
use crate::types::StatusSnapshot;
use super::{CacheState, Clock, RefreshScheduler, StatusAggregator, StatusCache};

pub struct StatusService {
    aggregator: Arc<StatusAggregator>,
    cache: Arc<StatusCache>,
    scheduler: Arc<RefreshScheduler>,
}

impl StatusService {
    pub fn new(
        aggregator: StatusAggregator,
        cache_ttl: Duration,
        min_refresh_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            cache: Arc::new(StatusCache::new(cache_ttl, clock.clone())),
            scheduler: Arc::new(RefreshScheduler::new(min_refresh_interval, clock)),
        }
    }

    /// Serve from cache without awaiting any probe. Cold and stale caches
    /// schedule a background refresh; a cold cache answers with a placeholder.
    pub fn read(&self) -> StatusSnapshot {
        match self.cache.read() {
            CacheState::Warm(snapshot) => snapshot.as_ref().clone(),
            CacheState::Stale(snapshot) => {
                self.trigger_refresh();
                snapshot.as_ref().clone()
            }
            CacheState::Cold => {
                self.trigger_refresh();
                self.aggregator.placeholder()
            }
        }
    }

    /// Run the aggregator inline, bypassing the cache, and store the result.
    pub async fn compute(&self) -> StatusSnapshot {
        let generation = self.cache.next_generation();
        let snapshot = self.aggregator.aggregate().await;
        self.cache.store(generation, snapshot.clone());
        snapshot
    }

    /// Spawn a detached refresh if the scheduler allows one. Must be called
    /// from within a tokio runtime.
    pub fn trigger_refresh(&self) -> bool {
        let Some(guard) = self.scheduler.try_begin() else {
            return false;
        };
        debug!("Scheduling background status refresh");

        let aggregator = Arc::clone(&self.aggregator);
        let cache = Arc::clone(&self.cache);
        let generation = cache.next_generation();
        tokio::spawn(async move {
            let _guard = guard;
            let snapshot = aggregator.aggregate().await;
            cache.store(generation, snapshot);
        });
        true
    }

    pub fn completions(&self) -> watch::Receiver<u64> {
        self.scheduler.completions()
    }

    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn aggregator(&self) -> &StatusAggregator {
        &self.aggregator
    }
}
