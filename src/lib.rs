//! Real-time energy telemetry simulation with timer-driven publish/subscribe delivery.
//!
//! A [`sim::TelemetryEngine`] turns a device registry into per-tick
//! [`sim::Snapshot`]s; a [`pubsub::Hub`] runs the tick timer only while
//! subscribers are registered and fans each snapshot out to all of them.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod pubsub;
/// Sampling, classification, aggregation, and historical series.
pub mod sim;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use pubsub::{Hub, SchedulerState, Subscription};
pub use sim::{Snapshot, TelemetryEngine};
