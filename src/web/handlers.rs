//! HTTP handlers for the status endpoints

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::types::StatusSnapshot;
use super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub compute: Option<String>,
}

impl StatusQuery {
    /// Lenient boolean: `true`, `1`, `yes`, `on` in any case.
    pub fn wants_compute(&self) -> bool {
        self.compute
            .as_deref()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }
}

/// GET /status
///
/// Serves the cached snapshot unless `compute` is set. Dependency failures
/// show up per service; this handler never fails.
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusSnapshot> {
    if query.wants_compute() {
        debug!("Forced status compute requested");
        return Json(state.status.compute().await);
    }
    Json(state.status.read())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// GET /health
pub async fn basic_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_flag_is_lenient() {
        let q = |v: &str| StatusQuery { compute: Some(v.to_string()) }.wants_compute();
        assert!(q("true"));
        assert!(q("TRUE"));
        assert!(q("1"));
        assert!(q("on"));
        assert!(!q("false"));
        assert!(!q("banana"));
        assert!(!StatusQuery::default().wants_compute());
    }
}
