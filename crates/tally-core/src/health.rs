//! Health/load report values and the throughput window.
//!
//! These are plain values: the gateway's reporter builds them on each timer
//! tick and hands them to a sink. Nothing here touches the counter store.

use std::time::{Duration, Instant};

/// Load metric name for requests per second.
pub const RPS_METRIC: &str = "RPS";

/// Instance health as seen by the cluster health collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Ok,
    Warning,
    Error,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Ok => "Ok",
            HealthState::Warning => "Warning",
            HealthState::Error => "Error",
        }
    }
}

/// One health record.
///
/// `sequence_number` is `None` when built by the reporter; the sink assigns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Property the report is filed under (e.g. "VotingServiceHealth").
    pub property: String,
    /// Sub-property (e.g. "Heartbeat").
    pub sub_property: String,
    pub state: HealthState,
    pub description: String,
    pub time_to_live: Duration,
    pub sequence_number: Option<u64>,
    /// Drop the report once its TTL elapses even if nothing newer arrived.
    pub remove_when_expired: bool,
}

/// Named numeric load signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMetric {
    pub name: String,
    pub value: u64,
}

impl LoadMetric {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn rps(value: u64) -> Self {
        Self::new(RPS_METRIC, value)
    }
}

/// Result of one window advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub total: u64,
    pub delta: u64,
    /// Whole seconds since the previous advance, never below 1.
    pub elapsed_secs: u64,
    pub rps: u64,
}

impl Throughput {
    /// Human-readable summary carried in the heartbeat description.
    pub fn describe(&self) -> String {
        format!(
            "{} requests since last report. RPS: {} Total requests: {}.",
            self.delta, self.rps, self.total
        )
    }
}

/// Running baseline of the request counter.
///
/// Owned by a single reporter; no interior mutability.
#[derive(Debug, Clone)]
pub struct ThroughputWindow {
    last_count: u64,
    last_report: Instant,
}

impl ThroughputWindow {
    pub fn new(now: Instant) -> Self {
        Self::starting_at(0, now)
    }

    /// Window with an explicit baseline.
    pub fn starting_at(last_count: u64, last_report: Instant) -> Self {
        Self {
            last_count,
            last_report,
        }
    }

    pub fn last_count(&self) -> u64 {
        self.last_count
    }

    pub fn last_report(&self) -> Instant {
        self.last_report
    }

    /// Compute throughput since the previous advance and move the baseline to
    /// (`total`, `now`).
    ///
    /// Elapsed time is truncated to whole seconds and clamped to at least 1,
    /// so an early or zero-length tick never divides by zero.
    pub fn advance(&mut self, total: u64, now: Instant) -> Throughput {
        let delta = total.saturating_sub(self.last_count);
        let elapsed_secs = now
            .saturating_duration_since(self.last_report)
            .as_secs()
            .max(1);
        let rps = delta / elapsed_secs;

        self.last_count = total;
        self.last_report = now;

        Throughput {
            total,
            delta,
            elapsed_secs,
            rps,
        }
    }
}
