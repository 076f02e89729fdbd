//! Status snapshot and threshold configuration

use serde::{Deserialize, Serialize};
use crate::errors::{StatusError, StatusResult};
use super::{ServiceResult, Status};

/// Age and backlog boundaries used to derive per-service status.
///
/// Serialized with the short key names the status endpoint has always echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(rename = "indexer_ok")]
    pub indexer_ok_sec: u64,
    #[serde(rename = "indexer_warn")]
    pub indexer_warn_sec: u64,
    #[serde(rename = "price_ok")]
    pub price_ok_sec: u64,
    #[serde(rename = "price_warn")]
    pub price_warn_sec: u64,
    #[serde(rename = "relay_warn")]
    pub relay_warn_count: u64,
    #[serde(rename = "relay_crit")]
    pub relay_crit_count: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            indexer_ok_sec: 30,
            indexer_warn_sec: 120,
            price_ok_sec: 600,
            price_warn_sec: 1800,
            relay_warn_count: 100,
            relay_crit_count: 1000,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> StatusResult<()> {
        if self.indexer_ok_sec > self.indexer_warn_sec {
            return Err(StatusError::InvalidThresholds {
                reason: format!(
                    "indexer ok ({}s) exceeds indexer warn ({}s)",
                    self.indexer_ok_sec, self.indexer_warn_sec
                ),
            });
        }
        if self.price_ok_sec > self.price_warn_sec {
            return Err(StatusError::InvalidThresholds {
                reason: format!(
                    "price ok ({}s) exceeds price warn ({}s)",
                    self.price_ok_sec, self.price_warn_sec
                ),
            });
        }
        if self.relay_warn_count > self.relay_crit_count {
            return Err(StatusError::InvalidThresholds {
                reason: format!(
                    "relay warn ({}) exceeds relay crit ({})",
                    self.relay_warn_count, self.relay_crit_count
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub generated_at: i64,
    pub thresholds: ThresholdConfig,
    pub services: Vec<ServiceResult>,
    pub stale: bool,
}

impl StatusSnapshot {
    /// Cold-cache placeholder: every service `unknown`/"loading", marked stale.
    pub fn placeholder<'a, I>(generated_at: i64, thresholds: ThresholdConfig, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            generated_at,
            thresholds,
            services: names.into_iter().map(ServiceResult::loading).collect(),
            stale: true,
        }
    }

    pub fn service(&self, name: &str) -> Option<&ServiceResult> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn overall(&self) -> Status {
        super::worst_of(self.services.iter().map(|s| s.status)).unwrap_or(Status::Unknown)
    }
}
