//! tally gateway library entry.
//!
//! Wires the counter store to HTTP handlers, the health reporter task and the
//! operational endpoints. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod health;
pub mod obs;
pub mod ops;
pub mod router;
