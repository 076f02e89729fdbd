//! End-to-end behavior of the cached status service

use async_trait::async_trait;
use auction_status::{
    errors::ProbeError,
    probes::ServiceProbe,
    status::{Collaborators, ManualClock, StatusService},
    test_helpers::{healthy_store, FakeBroker, InMemoryStore, StaticChainHead},
    ServiceResult, Status, StatusAggregator, ThresholdConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NOW: i64 = 1_700_000_000;
const TTL: Duration = Duration::from_secs(30);
const MIN_INTERVAL: Duration = Duration::from_secs(5);

/// Counts how many times the aggregator ran it.
struct CountingProbe {
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceProbe for CountingProbe {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceResult::new(self.name(), Status::Ok, "counted"))
    }
}

/// First call is slow; every call reports its sequence number.
struct SequencedProbe {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ServiceProbe for SequencedProbe {
    fn name(&self) -> &'static str {
        "sequenced"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn check(&self) -> Result<ServiceResult, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(ServiceResult::new(self.name(), Status::Ok, format!("call {}", call)))
    }
}

fn counting_service(clock: &ManualClock) -> (StatusService, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let probes: Vec<Arc<dyn ServiceProbe>> = vec![Arc::new(CountingProbe { runs: runs.clone() })];
    let aggregator = StatusAggregator::new(
        probes,
        ThresholdConfig::default(),
        Arc::new(clock.clone()),
    );
    let service = StatusService::new(aggregator, TTL, MIN_INTERVAL, Arc::new(clock.clone()));
    (service, runs)
}

fn pipeline_service(clock: &ManualClock, store: InMemoryStore) -> StatusService {
    let aggregator = StatusAggregator::standard(
        Collaborators {
            store: Arc::new(store),
            broker: Some(Arc::new(FakeBroker { stream_readable: true, ping: Some(true) })),
            chain_head: Some(Arc::new(StaticChainHead::Head(1_003))),
            stream_key: "events".to_string(),
        },
        ThresholdConfig::default(),
        Arc::new(clock.clone()),
    );
    StatusService::new(aggregator, TTL, MIN_INTERVAL, Arc::new(clock.clone()))
}

async fn wait_for_completions(service: &StatusService, target: u64) {
    let mut completions = service.completions();
    tokio::time::timeout(Duration::from_secs(5), completions.wait_for(|n| *n >= target))
        .await
        .expect("refresh did not complete in time")
        .expect("scheduler dropped");
}

#[tokio::test]
async fn cold_start_returns_placeholder_and_refreshes_once() {
    let clock = ManualClock::new(NOW);
    let service = pipeline_service(&clock, InMemoryStore::new(healthy_store(NOW)));

    let first = service.read();
    assert!(first.stale);
    assert_eq!(first.services.len(), 7);
    assert!(first
        .services
        .iter()
        .all(|s| s.status == Status::Unknown && s.detail == "loading"));

    wait_for_completions(&service, 1).await;

    let warm = service.read();
    assert!(!warm.stale);
    assert_eq!(warm.services.len(), 7);
    assert_eq!(warm.overall(), Status::Ok);
    assert_eq!(*service.completions().borrow(), 1);
}

#[tokio::test]
async fn triggers_within_interval_start_one_run() {
    let clock = ManualClock::new(NOW);
    let (service, runs) = counting_service(&clock);

    assert!(service.trigger_refresh());
    assert!(!service.trigger_refresh());
    wait_for_completions(&service, 1).await;

    clock.advance(Duration::from_secs(2));
    assert!(!service.trigger_refresh());
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    clock.advance(MIN_INTERVAL);
    assert!(service.trigger_refresh());
    wait_for_completions(&service, 2).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn repeated_cold_reads_schedule_a_single_refresh() {
    let clock = ManualClock::new(NOW);
    let (service, runs) = counting_service(&clock);

    for _ in 0..5 {
        assert!(service.read().stale);
    }
    wait_for_completions(&service, 1).await;

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!service.read().stale);
}

#[tokio::test]
async fn warm_cache_does_not_refresh() {
    let clock = ManualClock::new(NOW);
    let (service, runs) = counting_service(&clock);

    service.compute().await;
    clock.advance(TTL);
    let snapshot = service.read();

    assert!(!snapshot.stale);
    assert!(!service.scheduler().state().in_progress);
    assert!(service.scheduler().state().last_trigger.is_none());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_cache_serves_old_snapshot_and_refreshes() {
    let clock = ManualClock::new(NOW);
    let (service, runs) = counting_service(&clock);

    let computed = service.compute().await;
    clock.advance(TTL + Duration::from_secs(1));

    let served = service.read();
    assert_eq!(served, computed);
    assert!(!served.stale);

    wait_for_completions(&service, 1).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    let refreshed = service.cache().current().unwrap();
    assert_eq!(refreshed.snapshot.generated_at, NOW + 31);
}

#[tokio::test]
async fn forced_compute_is_idempotent_apart_from_timestamp() {
    let clock = ManualClock::new(NOW);
    let service = pipeline_service(&clock, InMemoryStore::new(healthy_store(NOW)));

    let first = service.compute().await;
    let mut second = service.compute().await;
    second.generated_at = first.generated_at;

    assert_eq!(first, second);
    assert_eq!(first.service("indexer").unwrap().detail, "updated 5s ago, 3 blocks behind");
    assert_eq!(first.service("prices").unwrap().metrics["sources"]["odos"]["age_sec"], 60);
}

#[tokio::test(start_paused = true)]
async fn forced_compute_wins_over_slower_background_refresh() {
    let clock = ManualClock::new(NOW);
    let calls = Arc::new(AtomicUsize::new(0));
    let probes: Vec<Arc<dyn ServiceProbe>> = vec![Arc::new(SequencedProbe { calls: calls.clone() })];
    let aggregator = StatusAggregator::new(probes, ThresholdConfig::default(), Arc::new(clock.clone()));
    let service = StatusService::new(aggregator, TTL, MIN_INTERVAL, Arc::new(clock));

    assert!(service.read().stale);
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let computed = service.compute().await;
    assert_eq!(computed.services[0].detail, "call 1");

    wait_for_completions(&service, 1).await;
    assert_eq!(service.cache().current().unwrap().snapshot.services[0].detail, "call 1");
    assert_eq!(service.read().services[0].detail, "call 1");
}

#[tokio::test]
async fn forced_compute_updates_cache() {
    let clock = ManualClock::new(NOW);
    let store = InMemoryStore::new(healthy_store(NOW));
    let service = pipeline_service(&clock, store.clone());

    store.update(|s| s.unpublished_relay = 1500);
    let snapshot = service.compute().await;

    assert_eq!(snapshot.service("relay").unwrap().status, Status::Down);
    let cached = service.cache().current().unwrap();
    assert_eq!(cached.snapshot.as_ref(), &snapshot);
    assert_eq!(service.read(), snapshot);
}

#[tokio::test]
async fn every_probe_reports_even_when_all_dependencies_fail() {
    let clock = ManualClock::new(NOW);
    let store = InMemoryStore::new(healthy_store(NOW));
    store.update(|s| s.failure = Some("could not connect to server".into()));
    let aggregator = StatusAggregator::standard(
        Collaborators {
            store: Arc::new(store),
            broker: Some(Arc::new(FakeBroker { stream_readable: false, ping: None })),
            chain_head: Some(Arc::new(StaticChainHead::Failing("connection refused".into()))),
            stream_key: "events".to_string(),
        },
        ThresholdConfig::default(),
        Arc::new(clock),
    );

    let snapshot = aggregator.aggregate().await;
    let statuses: Vec<(&str, Status)> = snapshot
        .services
        .iter()
        .map(|s| (s.name.as_str(), s.status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("api", Status::Ok),
            ("postgres", Status::Down),
            ("redis", Status::Down),
            ("rpc", Status::Down),
            ("indexer", Status::Unknown),
            ("prices", Status::Unknown),
            ("relay", Status::Unknown),
        ]
    );
}
