//! Probe recovery: bounded execution and failure-to-status mapping

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::warn;
use crate::{
    probes::ServiceProbe,
    types::{ServiceResult, Status},
};
use super::ProbeError;

/// Outcome of one bounded probe run.
#[derive(Debug, Clone)]
pub struct ProbeRun {
    pub result: ServiceResult,
    pub error: Option<ProbeError>,
}

impl ProbeRun {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

impl ProbeError {
    /// `Down` when the dependency actively failed, `Unknown` when the check was inconclusive.
    pub fn status(&self) -> Status {
        match self {
            ProbeError::Connection { .. } | ProbeError::DataMissing { .. } => Status::Down,
            ProbeError::Timeout { .. }
            | ProbeError::Inconclusive { .. }
            | ProbeError::Unsupported { .. } => Status::Unknown,
        }
    }
}

pub fn recover(name: &str, status: Status, error: &ProbeError) -> ServiceResult {
    ServiceResult::new(name, status, error.to_string())
}

/// Run a probe under its own timeout, catching errors and panics.
///
/// Always yields a result for the probe's service name.
pub async fn run_probe(probe: &dyn ServiceProbe) -> ProbeRun {
    let name = probe.name();
    let limit = probe.timeout();
    let guarded = AssertUnwindSafe(probe.check()).catch_unwind();

    let error = match tokio::time::timeout(limit, guarded).await {
        Ok(Ok(Ok(result))) => return ProbeRun { result, error: None },
        Ok(Ok(Err(e))) => e,
        Ok(Err(_panic)) => ProbeError::Inconclusive {
            message: "probe panicked".to_string(),
        },
        Err(_) => ProbeError::Timeout { after: limit },
    };

    let status = match error {
        ProbeError::Timeout { .. } => probe.timeout_status(),
        _ => error.status(),
    };
    warn!(service = name, error = %error, status = %status, "Probe failed");
    ProbeRun {
        result: recover(name, status, &error),
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedProbe {
        outcome: Result<ServiceResult, ProbeError>,
        delay: Duration,
    }

    #[async_trait]
    impl ServiceProbe for FixedProbe {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(500)
        }

        async fn check(&self) -> Result<ServiceResult, ProbeError> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    struct PanickingProbe;

    #[async_trait]
    impl ServiceProbe for PanickingProbe {
        fn name(&self) -> &'static str {
            "panicky"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(500)
        }

        async fn check(&self) -> Result<ServiceResult, ProbeError> {
            panic!("boom");
        }
    }

    #[test]
    fn error_kinds_map_to_status() {
        assert_eq!(ProbeError::connection("refused").status(), Status::Down);
        assert_eq!(
            ProbeError::DataMissing { what: "no rows".into() }.status(),
            Status::Down
        );
        assert_eq!(
            ProbeError::Timeout { after: Duration::from_secs(1) }.status(),
            Status::Unknown
        );
        assert_eq!(ProbeError::inconclusive("bad sql").status(), Status::Unknown);
        assert_eq!(
            ProbeError::Unsupported { reason: "no client".into() }.status(),
            Status::Unknown
        );
    }

    #[tokio::test]
    async fn successful_probe_passes_through() {
        let probe = FixedProbe {
            outcome: Ok(ServiceResult::new("fixed", Status::Ok, "fine")),
            delay: Duration::ZERO,
        };
        let run = run_probe(&probe).await;
        assert!(!run.failed());
        assert_eq!(run.result.status, Status::Ok);
        assert_eq!(run.result.detail, "fine");
    }

    #[tokio::test]
    async fn connection_error_becomes_down_with_detail() {
        let probe = FixedProbe {
            outcome: Err(ProbeError::connection("connection refused")),
            delay: Duration::ZERO,
        };
        let run = run_probe(&probe).await;
        assert!(run.failed());
        assert_eq!(run.result.name, "fixed");
        assert_eq!(run.result.status, Status::Down);
        assert_eq!(run.result.detail, "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_is_abandoned_at_timeout() {
        let probe = FixedProbe {
            outcome: Ok(ServiceResult::new("fixed", Status::Ok, "late")),
            delay: Duration::from_secs(30),
        };
        let started = tokio::time::Instant::now();
        let run = run_probe(&probe).await;

        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(run.result.status, Status::Unknown);
        assert_eq!(run.result.detail, "timeout after 500ms");
        assert!(matches!(run.error, Some(ProbeError::Timeout { .. })));
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let run = run_probe(&PanickingProbe).await;
        assert_eq!(run.result.name, "panicky");
        assert_eq!(run.result.status, Status::Unknown);
        assert_eq!(run.result.detail, "probe panicked");
    }
}
