//! Health and load reporting.
//!
//! A `HealthReporter` task wakes on a fixed interval, derives RPS from the
//! store's request counter and pushes a heartbeat plus load metric to a
//! `HealthSink`. The in-process sink stands in for the cluster health
//! collector and backs the `/ops/health` endpoint.

pub mod reporter;
pub mod sink;

pub use reporter::HealthReporter;
pub use sink::{HealthSink, InMemoryHealthSink, SinkSnapshot};
