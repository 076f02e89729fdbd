//! Per-service probe result

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::Status;

/// Upper bound on `detail` length, in characters.
pub const MAX_DETAIL_CHARS: usize = 200;

pub type Metrics = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult {
    pub name: String,
    pub status: Status,
    pub detail: String,
    pub metrics: Metrics,
}

impl ServiceResult {
    pub fn new(name: impl Into<String>, status: Status, detail: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: truncate_detail(detail.as_ref()),
            metrics: Metrics::new(),
        }
    }

    /// Attach metrics. Non-object values are ignored.
    pub fn with_metrics(mut self, metrics: Value) -> Self {
        if let Value::Object(map) = metrics {
            self.metrics = map;
        }
        self
    }

    /// Placeholder used while no snapshot has been computed yet.
    pub fn loading(name: impl Into<String>) -> Self {
        Self::new(name, Status::Unknown, "loading")
    }
}

pub fn truncate_detail(detail: &str) -> String {
    match detail.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((idx, _)) => detail[..idx].to_string(),
        None => detail.to_string(),
    }
}
