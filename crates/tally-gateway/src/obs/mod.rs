//! Lightweight in-process metrics.
//!
//! Counters, gauges and histograms are stored as atomics behind `DashMap`
//! label sets and rendered in Prometheus text format by `/metrics`.

pub mod metrics;

pub use metrics::TallyMetrics;
