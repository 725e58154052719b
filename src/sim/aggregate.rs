//! System-level roll-ups over one tick's readings.

use super::math::{efficiency_pct, round2};
use super::types::Reading;

/// Totals derived from a tick's readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of readings, rounded once to two decimals.
    pub total_consumption: f64,
    /// Unrounded sum, used as the forecast basis.
    pub raw_total: f64,
    /// Count of Critical or Warning readings.
    pub active_alerts: usize,
    /// `round(system_base / total * 100)`, 0 when the total is zero.
    pub efficiency: u32,
}

impl Totals {
    /// Rolls up `readings` against the configured system baseline.
    pub fn from_readings(readings: &[Reading], system_base: f64) -> Self {
        let raw_total: f64 = readings.iter().map(|r| r.current_consumption).sum();
        let active_alerts = readings.iter().filter(|r| r.status.is_active_alert()).count();

        Self {
            total_consumption: round2(raw_total),
            raw_total,
            active_alerts,
            efficiency: efficiency_pct(system_base, raw_total),
        }
    }
}
