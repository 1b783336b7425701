//! tally core: the concurrent counter store, health/load value types and the
//! throughput window used by the reporter.
//!
//! This crate carries no transport or async runtime dependencies. The gateway
//! wires it to HTTP and to the reporting timer.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Invalid or missing keys are frequent, expected input and always surface as
//! `TallyError` values.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod health;
pub mod store;

/// Shared result type.
pub use error::{Result, TallyError};
pub use health::{HealthReport, HealthState, LoadMetric, Throughput, ThroughputWindow};
pub use store::{CounterStore, StoreOptions};
