//! Indexer recency and block lag

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::{
    errors::ProbeError,
    network::ChainHeadSource,
    status::{age_since, status_from_age, status_from_block_lag, Clock},
    storage::StatusStore,
    types::{ServiceResult, Status, ThresholdConfig},
};
use super::{ServiceProbe, INDEXER_PROBE_TIMEOUT, RPC_HEAD_TIMEOUT};

/// Age of the last checkpoint against the indexer thresholds, combined with
/// block lag behind the chain head when the head is reachable.
pub struct IndexerProbe {
    store: Arc<dyn StatusStore>,
    chain_head: Option<Arc<dyn ChainHeadSource>>,
    thresholds: ThresholdConfig,
    clock: Arc<dyn Clock>,
}

impl IndexerProbe {
    pub fn new(
        store: Arc<dyn StatusStore>,
        chain_head: Option<Arc<dyn ChainHeadSource>>,
        thresholds: ThresholdConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, chain_head, thresholds, clock }
    }

    /// Head lookup never fails the probe; an unreachable head just drops the lag signal.
    async fn fetch_chain_head(&self) -> Option<u64> {
        let source = self.chain_head.as_ref()?;
        match tokio::time::timeout(RPC_HEAD_TIMEOUT, source.chain_head()).await {
            Ok(Ok(head)) => Some(head),
            Ok(Err(e)) => {
                debug!(error = %e, "Chain head unavailable for lag check");
                None
            }
            Err(_) => {
                debug!("Chain head lookup timed out");
                None
            }
        }
    }
}

#[async_trait]
impl ServiceProbe for IndexerProbe {
    fn name(&self) -> &'static str {
        "indexer"
    }

    fn timeout(&self) -> Duration {
        INDEXER_PROBE_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        // Head lookup overlaps the checkpoint read; both share the probe timeout.
        let (checkpoint, chain_head) =
            tokio::join!(self.store.latest_indexer_checkpoint(), self.fetch_chain_head());
        let checkpoint = checkpoint
            .map_err(|e| ProbeError::inconclusive(format!("{:#}", e)))?
            .ok_or_else(|| ProbeError::DataMissing {
                what: "No indexer_state rows".to_string(),
            })?;

        let age = age_since(self.clock.unix_now(), checkpoint.updated_at);

        let age_status = status_from_age(age, self.thresholds.indexer_ok_sec, self.thresholds.indexer_warn_sec);
        let block_lag = match chain_head {
            Some(head) if checkpoint.last_block > 0 => head.saturating_sub(checkpoint.last_block),
            _ => 0,
        };
        let status = combined_indexer_status(age_status, status_from_block_lag(block_lag));

        let mut detail = format!("updated {}s ago", age);
        if chain_head.is_some() {
            detail.push_str(&format!(", {} blocks behind", block_lag));
        }

        Ok(ServiceResult::new(self.name(), status, detail).with_metrics(json!({
            "last_block": checkpoint.last_block,
            "age_sec": age,
            "chain_head": chain_head,
            "block_lag": block_lag,
        })))
    }
}

/// Final indexer status is never better than either input.
pub fn combined_indexer_status(age_status: Status, lag_status: Status) -> Status {
    age_status.worse(lag_status)
}
