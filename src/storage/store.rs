//! Status store collaborator contract

use anyhow::Result;
use async_trait::async_trait;

/// Latest progress recorded by the indexing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexerCheckpoint {
    /// Unix seconds.
    pub updated_at: i64,
    pub last_block: u64,
}

/// Most recent observation for one upstream price source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSourceObservation {
    pub source: String,
    /// Unix seconds, `None` when the source has no usable timestamp.
    pub latest_timestamp: Option<i64>,
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Trivial liveness query. `Ok(false)` means the query ran but returned garbage.
    async fn ping(&self) -> Result<bool>;

    async fn latest_indexer_checkpoint(&self) -> Result<Option<IndexerCheckpoint>>;

    async fn latest_price_per_source(&self) -> Result<Vec<PriceSourceObservation>>;

    async fn pending_price_requests(&self) -> Result<u64>;

    async fn unpublished_relay_events(&self) -> Result<u64>;
}
