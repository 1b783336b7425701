//! Periodic health/load reporter.
//!
//! One cycle: read the store's request counter, advance the throughput
//! window, then emit a heartbeat and an RPS load metric. The window advances
//! before emission, so a failed emission never leaves a stale baseline for
//! the next tick. Cycles run back to back on a single task and never overlap.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tally_core::error::{Result, TallyError};
use tally_core::{CounterStore, HealthReport, HealthState, LoadMetric, Throughput, ThroughputWindow};

use crate::config::HealthConfig;
use crate::health::sink::HealthSink;
use crate::obs::TallyMetrics;

const INJECTED_SUB_PROPERTY: &str = "Error_Heartbeat";

pub struct HealthReporter {
    store: Arc<CounterStore>,
    sink: Arc<dyn HealthSink>,
    metrics: Arc<TallyMetrics>,
    cfg: HealthConfig,
    window: ThroughputWindow,
}

impl HealthReporter {
    pub fn new(
        store: Arc<CounterStore>,
        sink: Arc<dyn HealthSink>,
        metrics: Arc<TallyMetrics>,
        cfg: HealthConfig,
    ) -> Self {
        Self {
            store,
            sink,
            metrics,
            cfg,
            window: ThroughputWindow::new(Instant::now()),
        }
    }

    /// Replace the starting baseline (mainly for tests).
    pub fn with_window(mut self, window: ThroughputWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> &ThroughputWindow {
        &self.window
    }

    /// Run one report cycle as of `now`.
    ///
    /// Sink failures are logged and counted, never returned: the cycle always
    /// completes and the next tick proceeds normally.
    pub async fn run_cycle(&mut self, now: Instant) -> Throughput {
        let total = self.store.request_count();
        let tp = self.window.advance(total, now);
        self.metrics
            .last_rps
            .set(i64::try_from(tp.rps).unwrap_or(i64::MAX));

        let emitted = tokio::time::timeout(self.cfg.sink_timeout(), self.emit(&tp))
            .await
            .unwrap_or_else(|_| {
                Err(TallyError::SinkUnavailable(format!(
                    "no answer within {}ms",
                    self.cfg.sink_timeout_ms
                )))
            });

        match emitted {
            Ok(seq) => {
                self.metrics.health_reports.inc(&[("result", "ok")]);
                tracing::info!(
                    delta = tp.delta,
                    rps = tp.rps,
                    total = tp.total,
                    seq,
                    "health reported"
                );
            }
            Err(e) => {
                self.metrics
                    .health_reports
                    .inc(&[("result", "sink_unavailable")]);
                tracing::warn!(error = %e, delta = tp.delta, rps = tp.rps, "health report failed");
            }
        }
        tp
    }

    /// Spawn the recurring task. The first report fires one interval after
    /// start. Flipping `shutdown` to `true` (or dropping its sender) cancels
    /// the timer; a cycle already emitting is allowed to finish.
    pub fn spawn(mut self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.cfg.interval();
            let mut tick = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(interval_ms = self.cfg.interval_ms, "health reporter started");
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        self.run_cycle(Instant::now()).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!("health reporter stopped");
        })
    }

    async fn emit(&self, tp: &Throughput) -> Result<u64> {
        let seq = self.sink.report_health(self.heartbeat(tp)).await?;
        self.sink.report_load(&[LoadMetric::rps(tp.rps)]).await?;

        if self.cfg.inject_error_report {
            self.sink.report_health(self.injected_error()).await?;
        }
        Ok(seq)
    }

    fn heartbeat(&self, tp: &Throughput) -> HealthReport {
        HealthReport {
            property: self.cfg.property.clone(),
            sub_property: self.cfg.sub_property.clone(),
            state: HealthState::Ok,
            description: tp.describe(),
            time_to_live: self.cfg.time_to_live(),
            sequence_number: None,
            remove_when_expired: false,
        }
    }

    fn injected_error(&self) -> HealthReport {
        HealthReport {
            property: self.cfg.property.clone(),
            sub_property: INJECTED_SUB_PROPERTY.into(),
            state: HealthState::Error,
            description: "Injected health error to force rollback.".into(),
            time_to_live: self.cfg.time_to_live(),
            sequence_number: None,
            remove_when_expired: true,
        }
    }
}
