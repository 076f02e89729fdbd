//! Message broker reachability

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    network::{BrokerClient, StreamCheck},
    types::{ServiceResult, Status},
};
use super::{ServiceProbe, BROKER_PROBE_TIMEOUT};

/// Reads the primary stream, falling back to PING when the read is refused.
pub struct BrokerProbe {
    client: Option<Arc<dyn BrokerClient>>,
    stream_key: String,
}

impl BrokerProbe {
    pub fn new(client: Option<Arc<dyn BrokerClient>>, stream_key: impl Into<String>) -> Self {
        Self {
            client,
            stream_key: stream_key.into(),
        }
    }
}

#[async_trait]
impl ServiceProbe for BrokerProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn timeout(&self) -> Duration {
        BROKER_PROBE_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let client = self.client.as_ref().ok_or_else(|| ProbeError::Unsupported {
            reason: "broker client not configured".to_string(),
        })?;
        let metrics = json!({ "stream": self.stream_key });

        let check = client
            .check_stream(&self.stream_key)
            .await
            .map_err(|e| ProbeError::connection(format!("{:#}", e)))?;
        let result = match check {
            StreamCheck::Readable => ServiceResult::new(
                self.name(),
                Status::Ok,
                format!("xrevrange({}) ok", self.stream_key),
            ),
            StreamCheck::Pong => ServiceResult::new(self.name(), Status::Ok, "PONG"),
            StreamCheck::NoPong => ServiceResult::new(self.name(), Status::Down, "No response"),
        };
        Ok(result.with_metrics(metrics))
    }
}
