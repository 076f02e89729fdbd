//! Price pipeline freshness

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    status::{age_since, status_from_age, Clock, MISSING_PRICE_AGE_SEC},
    storage::StatusStore,
    types::{worst_of, ServiceResult, Status, ThresholdConfig},
};
use super::{ServiceProbe, PRICE_PROBE_TIMEOUT};

/// Worst source age against the price thresholds, but only while there is
/// pending price work; an idle pipeline is `ok` regardless of age.
pub struct PriceFreshnessProbe {
    store: Arc<dyn StatusStore>,
    thresholds: ThresholdConfig,
    clock: Arc<dyn Clock>,
}

impl PriceFreshnessProbe {
    pub fn new(store: Arc<dyn StatusStore>, thresholds: ThresholdConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, thresholds, clock }
    }
}

#[async_trait]
impl ServiceProbe for PriceFreshnessProbe {
    fn name(&self) -> &'static str {
        "prices"
    }

    fn timeout(&self) -> Duration {
        PRICE_PROBE_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let sources = self
            .store
            .latest_price_per_source()
            .await
            .map_err(|e| ProbeError::inconclusive(format!("{:#}", e)))?;
        let pending = self
            .store
            .pending_price_requests()
            .await
            .map_err(|e| ProbeError::inconclusive(format!("{:#}", e)))?;

        let now = self.clock.unix_now();
        let mut per_source = Map::new();
        let mut statuses = Vec::with_capacity(sources.len());
        for observation in &sources {
            let age = match observation.latest_timestamp {
                Some(ts) if ts > 0 => age_since(now, ts),
                _ => MISSING_PRICE_AGE_SEC,
            };
            let status = status_from_age(age, self.thresholds.price_ok_sec, self.thresholds.price_warn_sec);
            statuses.push(status);
            per_source.insert(
                observation.source.clone(),
                json!({ "age_sec": age, "status": status }),
            );
        }

        let status = if pending == 0 {
            Status::Ok
        } else {
            worst_of(statuses).unwrap_or(Status::Unknown)
        };

        Ok(ServiceResult::new(self.name(), status, format!("pending: {}", pending))
            .with_metrics(json!({
                "pending": pending,
                "sources": Value::Object(per_source),
            })))
    }
}
