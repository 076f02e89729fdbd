//! Primary database liveness

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use crate::{
    errors::ProbeError,
    storage::StatusStore,
    types::{ServiceResult, Status},
};
use super::{ServiceProbe, DATABASE_PROBE_TIMEOUT};

pub struct DatabaseProbe {
    store: Arc<dyn StatusStore>,
}

impl DatabaseProbe {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ServiceProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn timeout(&self) -> Duration {
        DATABASE_PROBE_TIMEOUT
    }

    fn timeout_status(&self) -> Status {
        Status::Down
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let alive = self.store.ping().await.map_err(|e| ProbeError::connection(format!("{:#}", e)))?;
        Ok(if alive {
            ServiceResult::new(self.name(), Status::Ok, "Connected")
        } else {
            ServiceResult::new(self.name(), Status::Down, "Query failed")
        })
    }
}
