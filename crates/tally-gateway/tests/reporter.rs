//! Health reporter cycles against in-process and failing sinks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;

use tally_core::error::{Result, TallyError};
use tally_core::{CounterStore, HealthReport, HealthState, LoadMetric, StoreOptions, ThroughputWindow};
use tally_gateway::config::HealthConfig;
use tally_gateway::health::{HealthReporter, HealthSink, InMemoryHealthSink};
use tally_gateway::obs::TallyMetrics;

struct FailingSink {
    calls: AtomicUsize,
}

#[async_trait]
impl HealthSink for FailingSink {
    async fn report_health(&self, _report: HealthReport) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(TallyError::SinkUnavailable("collector down".into()))
    }

    async fn report_load(&self, _metrics: &[LoadMetric]) -> Result<()> {
        Err(TallyError::SinkUnavailable("collector down".into()))
    }
}

struct StalledSink;

#[async_trait]
impl HealthSink for StalledSink {
    async fn report_health(&self, _report: HealthReport) -> Result<u64> {
        std::future::pending::<()>().await;
        Ok(0)
    }

    async fn report_load(&self, _metrics: &[LoadMetric]) -> Result<()> {
        Ok(())
    }
}

fn store_with_requests(n: usize) -> Arc<CounterStore> {
    let store = Arc::new(CounterStore::new(StoreOptions::default()));
    for _ in 0..n {
        let _ = store.increment("k");
    }
    store
}

fn reporter(
    store: Arc<CounterStore>,
    sink: Arc<dyn HealthSink>,
    metrics: Arc<TallyMetrics>,
    cfg: HealthConfig,
) -> HealthReporter {
    HealthReporter::new(store, sink, metrics, cfg)
}

#[tokio::test]
async fn cycle_reports_heartbeat_and_rps() {
    let store = store_with_requests(40);
    let sink = Arc::new(InMemoryHealthSink::new());
    let metrics = Arc::new(TallyMetrics::default());
    let t0 = Instant::now();

    let mut r = reporter(store, sink.clone(), metrics.clone(), HealthConfig::default())
        .with_window(ThroughputWindow::starting_at(10, t0));

    let tp = r.run_cycle(t0 + Duration::from_secs(15)).await;
    assert_eq!((tp.delta, tp.rps, tp.total), (30, 2, 40));

    let hb = sink.latest("VotingServiceHealth", "Heartbeat").expect("heartbeat");
    assert_eq!(hb.state, HealthState::Ok);
    assert_eq!(hb.time_to_live, Duration::from_secs(60));
    assert!(!hb.remove_when_expired);
    assert_eq!(hb.sequence_number, Some(1));
    assert_eq!(hb.description, "30 requests since last report. RPS: 2 Total requests: 40.");

    let snap = sink.snapshot();
    assert_eq!(snap.load, vec![LoadMetric::rps(2)]);
    assert_eq!(metrics.last_rps.get(), 2);
    assert_eq!(metrics.health_reports.get(&[("result", "ok")]), 1);
}

#[tokio::test]
async fn reporting_does_not_touch_the_store() {
    let store = store_with_requests(3);
    let sink = Arc::new(InMemoryHealthSink::new());
    let mut r = reporter(
        store.clone(),
        sink,
        Arc::new(TallyMetrics::default()),
        HealthConfig::default(),
    );

    r.run_cycle(Instant::now()).await;
    r.run_cycle(Instant::now()).await;
    assert_eq!(store.request_count(), 3);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn sink_assigns_increasing_sequence_numbers() {
    let store = store_with_requests(0);
    let sink = Arc::new(InMemoryHealthSink::new());
    let mut r = reporter(
        store.clone(),
        sink.clone(),
        Arc::new(TallyMetrics::default()),
        HealthConfig::default(),
    );

    let mut seen = Vec::new();
    for _ in 0..3 {
        let _ = store.increment("k");
        r.run_cycle(Instant::now()).await;
        seen.push(sink.latest("VotingServiceHealth", "Heartbeat").unwrap().sequence_number.unwrap());
    }
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "seq={seen:?}");
}

#[tokio::test]
async fn failing_sink_still_advances_baseline() {
    let store = store_with_requests(25);
    let sink = Arc::new(FailingSink {
        calls: AtomicUsize::new(0),
    });
    let metrics = Arc::new(TallyMetrics::default());
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_secs(5);

    let mut r = reporter(store.clone(), sink.clone(), metrics.clone(), HealthConfig::default())
        .with_window(ThroughputWindow::starting_at(0, t0));

    let tp = r.run_cycle(t1).await;
    assert_eq!(tp.rps, 5);
    assert_eq!(r.window().last_count(), 25);
    assert_eq!(r.window().last_report(), t1);
    assert_eq!(metrics.health_reports.get(&[("result", "sink_unavailable")]), 1);

    // next tick computes from the advanced baseline, not from zero
    for _ in 0..10 {
        let _ = store.increment("k");
    }
    let tp = r.run_cycle(t1 + Duration::from_secs(10)).await;
    assert_eq!(tp.delta, 10);
    assert_eq!(tp.rps, 1);
    assert_eq!(sink.calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn stalled_sink_times_out() {
    let store = store_with_requests(1);
    let metrics = Arc::new(TallyMetrics::default());
    let cfg = HealthConfig {
        interval_ms: 1000,
        sink_timeout_ms: 20,
        ..HealthConfig::default()
    };
    let mut r = reporter(store, Arc::new(StalledSink), metrics.clone(), cfg);

    let tp = r.run_cycle(Instant::now()).await;
    assert_eq!(tp.total, 1);
    assert_eq!(r.window().last_count(), 1);
    assert_eq!(metrics.health_reports.get(&[("result", "sink_unavailable")]), 1);
}

#[tokio::test]
async fn injected_error_report() {
    let store = store_with_requests(0);
    let sink = Arc::new(InMemoryHealthSink::new());
    let cfg = HealthConfig {
        inject_error_report: true,
        ..HealthConfig::default()
    };
    let mut r = reporter(store, sink.clone(), Arc::new(TallyMetrics::default()), cfg);
    r.run_cycle(Instant::now()).await;

    let err = sink.latest("VotingServiceHealth", "Error_Heartbeat").expect("error report");
    assert_eq!(err.state, HealthState::Error);
    assert!(err.remove_when_expired);
    assert_eq!(err.time_to_live, Duration::from_secs(60));

    let hb = sink.latest("VotingServiceHealth", "Heartbeat").unwrap();
    assert!(err.sequence_number > hb.sequence_number);
}

#[tokio::test]
async fn spawned_reporter_ticks_until_shutdown() {
    let store = store_with_requests(5);
    let sink = Arc::new(InMemoryHealthSink::new());
    let cfg = HealthConfig {
        interval_ms: 30,
        sink_timeout_ms: 10,
        ..HealthConfig::default()
    };
    let (tx, rx) = watch::channel(false);
    let handle = reporter(store, sink.clone(), Arc::new(TallyMetrics::default()), cfg).spawn(rx);

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("reporter must stop")
        .unwrap();

    let seq = sink.latest("VotingServiceHealth", "Heartbeat").unwrap().sequence_number.unwrap();
    assert!(seq >= 2, "seq={seq}");

    // no further reports after shutdown
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after = sink.latest("VotingServiceHealth", "Heartbeat").unwrap().sequence_number.unwrap();
    assert_eq!(seq, after);
}

#[tokio::test]
async fn app_state_reporter_respects_enabled_flag() {
    use tally_gateway::{app_state::AppState, config};

    let on = AppState::new(config::load_from_str("version: 1\n").unwrap());
    assert!(on.health_reporter().is_some());

    let off = AppState::new(config::load_from_str("version: 1\nhealth:\n  enabled: false\n").unwrap());
    assert!(off.health_reporter().is_none());
}
