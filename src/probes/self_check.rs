//! The API process itself

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    types::{ServiceResult, Status},
};
use super::{ServiceProbe, SELF_PROBE_TIMEOUT};

/// Always `ok`: if this runs, the process is serving.
#[derive(Debug, Default)]
pub struct SelfProbe;

#[async_trait]
impl ServiceProbe for SelfProbe {
    fn name(&self) -> &'static str {
        "api"
    }

    fn timeout(&self) -> Duration {
        SELF_PROBE_TIMEOUT
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        Ok(ServiceResult::new(self.name(), Status::Ok, "status api responding")
            .with_metrics(json!({ "version": env!("CARGO_PKG_VERSION") })))
    }
}
