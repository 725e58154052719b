//! Snapshot engine tying the registry, generators, classifier, and forecaster together.

use chrono::{DateTime, Local};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::config::EngineConfig;
use crate::devices::DeviceRegistry;
use crate::error::Result;
use crate::forecast::TrendForecast;

use super::aggregate::Totals;
use super::classifier::alerts_for;
use super::history::{HistoryPoint, Period, generate_historical_data};
use super::sampler::generate_readings;
use super::types::Snapshot;

/// Baseline used for system efficiency and historical series in the default profile.
pub const DEFAULT_SYSTEM_BASE: f64 = 150.0;

/// Telemetry engine owning the device registry and its random source.
///
/// Generic over `R: Rng` so tests can inject a seeded source; production
/// code uses the OS-seeded `StdRng`.
pub struct TelemetryEngine<R: Rng = StdRng> {
    registry: DeviceRegistry,
    system_base: f64,
    history_base: f64,
    forecaster: TrendForecast,
    rng: R,
}

impl TelemetryEngine<StdRng> {
    /// Builds an engine from a validated configuration.
    ///
    /// A configured seed makes every snapshot and series reproducible.
    ///
    /// # Errors
    ///
    /// Returns the first registry error, or `EngineError::Config` if validation fails.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.ensure_valid()?;
        let registry = DeviceRegistry::new(config.device_list())?;
        let rng = match config.engine.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::with_rng(registry, rng)
            .with_system_base(config.engine.system_base_consumption)
            .with_history_base(config.engine.history_base_load))
    }
}

impl<R: Rng> TelemetryEngine<R> {
    /// Creates an engine over `registry` using `rng` for every draw.
    pub fn with_rng(registry: DeviceRegistry, rng: R) -> Self {
        Self {
            registry,
            system_base: DEFAULT_SYSTEM_BASE,
            history_base: DEFAULT_SYSTEM_BASE,
            forecaster: TrendForecast,
            rng,
        }
    }

    /// Overrides the baseline used for system efficiency.
    pub fn with_system_base(mut self, system_base: f64) -> Self {
        self.system_base = system_base;
        self
    }

    /// Overrides the base load the historical generator shapes.
    pub fn with_history_base(mut self, history_base: f64) -> Self {
        self.history_base = history_base;
        self
    }

    /// The registry this engine samples.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Baseline used for system efficiency.
    pub fn system_base(&self) -> f64 {
        self.system_base
    }

    /// Assembles one snapshot stamped at `at`.
    ///
    /// Readings use `at`'s local hour for the diurnal multiplier. The returned
    /// snapshot has one reading per registered device, in registry order.
    pub fn snapshot_at(&mut self, at: DateTime<Local>) -> Snapshot {
        let readings = generate_readings(self.registry.iter(), at, &mut self.rng);
        let alerts = alerts_for(&readings, at);
        let totals = Totals::from_readings(&readings, self.system_base);
        let forecast = self.forecaster.forecast(totals.raw_total, &mut self.rng);

        debug!(
            total_kwh = totals.total_consumption,
            active_alerts = totals.active_alerts,
            alerts = alerts.len(),
            "snapshot assembled"
        );

        Snapshot {
            timestamp: at,
            total_consumption: totals.total_consumption,
            readings,
            active_alerts: totals.active_alerts,
            alerts,
            forecast,
            efficiency: totals.efficiency,
        }
    }

    /// Assembles one snapshot stamped with the current local time.
    pub fn snapshot(&mut self) -> Snapshot {
        self.snapshot_at(Local::now())
    }

    /// Generates a fresh historical series ending at `now`.
    pub fn historical_at(&mut self, period: Period, now: DateTime<Local>) -> Vec<HistoryPoint> {
        generate_historical_data(period, self.history_base, now, &mut self.rng)
    }

    /// Generates a fresh historical series ending at the current local time.
    pub fn historical(&mut self, period: Period) -> Vec<HistoryPoint> {
        self.historical_at(period, Local::now())
    }
}
