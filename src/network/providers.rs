//! Chain head lookup over JSON-RPC

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use crate::ConcreteProvider;

#[async_trait]
pub trait ChainHeadSource: Send + Sync {
    /// Current chain head block number.
    async fn chain_head(&self) -> Result<u64>;
}

/// `eth_blockNumber` against a single RPC endpoint, bounded by `timeout`.
pub struct RpcChainHead {
    provider: Arc<ConcreteProvider>,
    timeout: Duration,
}

impl RpcChainHead {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let provider: Arc<ConcreteProvider> = Arc::new(
            ProviderBuilder::new()
                .on_http(rpc_url.parse().context("Invalid RPC URL")?)
                .boxed()
        );

        info!("🔗 RPC chain head source configured");
        Ok(Self { provider, timeout })
    }
}

#[async_trait]
impl ChainHeadSource for RpcChainHead {
    async fn chain_head(&self) -> Result<u64> {
        let block = tokio::time::timeout(self.timeout, self.provider.get_block_number())
            .await
            .map_err(|_| anyhow::anyhow!("eth_blockNumber timed out after {}ms", self.timeout.as_millis()))?
            .context("Failed to get block number")?;

        debug!(block, "Fetched chain head");
        Ok(block)
    }
}
