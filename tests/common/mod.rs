//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use energy_telemetry::devices::DeviceRegistry;
use energy_telemetry::pubsub::{Hub, ManualTicker};
use energy_telemetry::sim::engine::TelemetryEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Default tick period used by hub fixtures.
pub const PERIOD: Duration = Duration::from_secs(2);

/// Engine over the five default devices with a fixed seed.
pub fn seeded_engine(seed: u64) -> TelemetryEngine {
    TelemetryEngine::with_rng(DeviceRegistry::default(), StdRng::seed_from_u64(seed))
}

/// Hub driven by a manual ticker; keep the returned ticker to fire ticks.
pub fn manual_hub(seed: u64) -> (Hub, ManualTicker) {
    let ticker = ManualTicker::new();
    let hub = Hub::new(seeded_engine(seed), ticker.clone(), PERIOD)
        .unwrap_or_else(|e| panic!("hub construction failed: {e}"));
    (hub, ticker)
}

/// A local timestamp on a fixed weekday at `hour:30`.
pub fn at_hour(hour: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 11, hour, 30, 0)
        .earliest()
        .unwrap_or_else(Local::now)
}
