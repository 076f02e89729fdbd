//! Chain RPC endpoint

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    network::ChainHeadSource,
    types::{ServiceResult, Status},
};
use super::{ServiceProbe, RPC_HEAD_TIMEOUT};

pub struct RpcHeadProbe {
    source: Option<Arc<dyn ChainHeadSource>>,
}

impl RpcHeadProbe {
    pub fn new(source: Option<Arc<dyn ChainHeadSource>>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ServiceProbe for RpcHeadProbe {
    fn name(&self) -> &'static str {
        "rpc"
    }

    fn timeout(&self) -> Duration {
        RPC_HEAD_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let source = self.source.as_ref().ok_or_else(|| ProbeError::Unsupported {
            reason: "rpc endpoint not configured".to_string(),
        })?;
        let head = source
            .chain_head()
            .await
            .map_err(|e| ProbeError::connection(format!("{:#}", e)))?;

        Ok(ServiceResult::new(self.name(), Status::Ok, format!("head block {}", head))
            .with_metrics(json!({ "chain_head": head })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::run_probe, test_helpers::StaticChainHead};

    fn probe(head: Option<StaticChainHead>) -> RpcHeadProbe {
        RpcHeadProbe::new(head.map(|h| Arc::new(h) as Arc<dyn ChainHeadSource>))
    }

    #[tokio::test]
    async fn reports_chain_head() {
        let result = probe(Some(StaticChainHead::Head(19_000_000))).check().await.unwrap();
        assert_eq!(result.status, Status::Ok);
        assert_eq!(result.detail, "head block 19000000");
        assert_eq!(result.metrics["chain_head"], 19_000_000);
    }

    #[tokio::test]
    async fn failing_endpoint_is_down() {
        let run = run_probe(&probe(Some(StaticChainHead::Failing("HTTP error 502".into())))).await;
        assert_eq!(run.result.status, Status::Down);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_endpoint_times_out_unknown() {
        let run = run_probe(&probe(Some(StaticChainHead::Hanging))).await;
        assert_eq!(run.result.status, Status::Unknown);
        assert_eq!(run.result.detail, "timeout after 1000ms");
    }

    #[tokio::test]
    async fn unconfigured_endpoint_is_unknown() {
        let run = run_probe(&probe(None)).await;
        assert_eq!(run.result.status, Status::Unknown);
        assert_eq!(run.result.detail, "rpc endpoint not configured");
    }
}
