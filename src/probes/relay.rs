//! Event relay outbox backlog

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    status::status_from_backlog,
    storage::StatusStore,
    types::{ServiceResult, ThresholdConfig},
};
use super::{ServiceProbe, RELAY_PROBE_TIMEOUT};

pub struct RelayBacklogProbe {
    store: Arc<dyn StatusStore>,
    thresholds: ThresholdConfig,
}

impl RelayBacklogProbe {
    pub fn new(store: Arc<dyn StatusStore>, thresholds: ThresholdConfig) -> Self {
        Self { store, thresholds }
    }
}

#[async_trait]
impl ServiceProbe for RelayBacklogProbe {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn timeout(&self) -> Duration {
        RELAY_PROBE_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let backlog = self
            .store
            .unpublished_relay_events()
            .await
            .map_err(|e| ProbeError::inconclusive(format!("{:#}", e)))?;
        let status = status_from_backlog(
            backlog,
            self.thresholds.relay_warn_count,
            self.thresholds.relay_crit_count,
        );

        Ok(ServiceResult::new(self.name(), status, format!("unpublished: {}", backlog))
            .with_metrics(json!({ "unpublished": backlog })))
    }
}
