//! In-memory collaborators for driving the status subsystem in tests

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::{
    network::{BrokerClient, ChainHeadSource, StreamCheck},
    storage::{IndexerCheckpoint, PriceSourceObservation, StatusStore},
};

/// Scripted contents of the pipeline tables.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub alive: bool,
    pub indexer: Option<IndexerCheckpoint>,
    pub prices: Vec<PriceSourceObservation>,
    pub pending_prices: u64,
    pub unpublished_relay: u64,
    /// When set, every query fails with this message.
    pub failure: Option<String>,
    /// Artificial latency applied to every query.
    pub delay: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    queries: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new(state: StoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut StoreState)) {
        f(&mut self.state.lock());
    }

    /// Total queries served, including failed ones.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.state.lock().delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock();
        match &state.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(f(&state)),
        }
    }
}

#[async_trait]
impl StatusStore for InMemoryStore {
    async fn ping(&self) -> Result<bool> {
        self.read(|s| s.alive).await
    }

    async fn latest_indexer_checkpoint(&self) -> Result<Option<IndexerCheckpoint>> {
        self.read(|s| s.indexer).await
    }

    async fn latest_price_per_source(&self) -> Result<Vec<PriceSourceObservation>> {
        self.read(|s| s.prices.clone()).await
    }

    async fn pending_price_requests(&self) -> Result<u64> {
        self.read(|s| s.pending_prices).await
    }

    async fn unpublished_relay_events(&self) -> Result<u64> {
        self.read(|s| s.unpublished_relay).await
    }
}

/// Chain head that returns a fixed block, an error, or hangs.
#[derive(Debug, Clone)]
pub enum StaticChainHead {
    Head(u64),
    Failing(String),
    Hanging,
}

#[async_trait]
impl ChainHeadSource for StaticChainHead {
    async fn chain_head(&self) -> Result<u64> {
        match self {
            StaticChainHead::Head(block) => Ok(*block),
            StaticChainHead::Failing(message) => Err(anyhow::anyhow!("{}", message)),
            StaticChainHead::Hanging => Ok(std::future::pending::<u64>().await),
        }
    }
}

/// Broker whose stream read and ping outcomes are scripted.
#[derive(Debug, Clone)]
pub struct FakeBroker {
    pub stream_readable: bool,
    /// `Some(answer)` for a ping reply, `None` for a ping error.
    pub ping: Option<bool>,
}

#[async_trait]
impl BrokerClient for FakeBroker {
    async fn check_stream(&self, _stream: &str) -> Result<StreamCheck> {
        if self.stream_readable {
            return Ok(StreamCheck::Readable);
        }
        match self.ping {
            Some(true) => Ok(StreamCheck::Pong),
            Some(false) => Ok(StreamCheck::NoPong),
            None => Err(anyhow::anyhow!("Connection refused (os error 111)")),
        }
    }
}

pub fn healthy_store(now: i64) -> StoreState {
    StoreState {
        alive: true,
        indexer: Some(IndexerCheckpoint {
            updated_at: now - 5,
            last_block: 1_000,
        }),
        prices: vec![PriceSourceObservation {
            source: "odos".to_string(),
            latest_timestamp: Some(now - 60),
        }],
        pending_prices: 0,
        unpublished_relay: 3,
        failure: None,
        delay: Duration::ZERO,
    }
}
