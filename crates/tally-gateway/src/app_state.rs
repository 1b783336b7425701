//! Shared application state.
//!
//! One `CounterStore` per process, injected into both the HTTP handlers and
//! the health reporter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tally_core::CounterStore;

use crate::config::TallyConfig;
use crate::health::{HealthReporter, InMemoryHealthSink};
use crate::obs::TallyMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    store: Arc<CounterStore>,
    sink: Arc<InMemoryHealthSink>,
    metrics: Arc<TallyMetrics>,
}

struct AppStateInner {
    cfg: TallyConfig,
    activity_seq: AtomicU64,
}

impl AppState {
    /// Build application state from an already validated config.
    pub fn new(cfg: TallyConfig) -> Self {
        let store = Arc::new(CounterStore::new(cfg.store.options()));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                activity_seq: AtomicU64::new(1),
            }),
            store,
            sink: Arc::new(InMemoryHealthSink::new()),
            metrics: Arc::new(TallyMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &TallyConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    pub fn health_sink(&self) -> Arc<InMemoryHealthSink> {
        Arc::clone(&self.sink)
    }

    pub fn metrics(&self) -> &TallyMetrics {
        &self.metrics
    }

    /// Reporter bound to this state's store, sink and metrics.
    /// `None` when health reporting is disabled in config.
    pub fn health_reporter(&self) -> Option<HealthReporter> {
        let cfg = &self.inner.cfg.health;
        if !cfg.enabled {
            return None;
        }
        Some(HealthReporter::new(
            Arc::clone(&self.store),
            self.sink.clone(),
            Arc::clone(&self.metrics),
            cfg.clone(),
        ))
    }

    /// Per-process id used to correlate request start/stop events.
    pub fn next_activity(&self) -> u64 {
        self.inner.activity_seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("tally_request_count", self.store.request_count()),
            ("tally_keys", self.store.len() as u64),
        ]
    }
}
