//! Core telemetry types: readings, alerts, forecasts, and the published snapshot.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::devices::{Device, DeviceId};

/// Discrete health status derived from a reading's ratio to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    Normal,
    Warning,
    Critical,
    Offline,
}

impl DeviceStatus {
    /// Critical and Warning readings count towards `activeAlerts`.
    pub fn is_active_alert(self) -> bool {
        matches!(self, Self::Critical | Self::Warning)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Offline => "Offline",
        };
        f.write_str(s)
    }
}

/// One device's consumption and derived status for a single tick.
///
/// Superseded, never updated, by the next tick's reading for the same device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// The device this reading belongs to.
    #[serde(flatten)]
    pub device: Device,
    /// Consumption for this tick, non-negative, two decimals.
    pub current_consumption: f64,
    /// Status derived from `current_consumption / base_consumption`.
    pub status: DeviceStatus,
    /// `round(base / current * 100)`, or 0 when `current` is zero.
    pub efficiency: u32,
    /// Generation time of the tick.
    pub last_update: DateTime<Local>,
}

/// Severity/category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Warning,
    Info,
    Success,
}

/// Event raised when a reading crosses a status threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique per tick per device.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Lookup key of the originating device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
}

/// Direction of the per-tick forecast trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    /// `Increasing` only for strictly positive coefficients; zero maps to `Decreasing`.
    pub fn from_coefficient(coefficient: f64) -> Self {
        if coefficient > 0.0 {
            Self::Increasing
        } else {
            Self::Decreasing
        }
    }
}

/// Short-horizon projection recomputed every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub next_hour: f64,
    pub next_day: f64,
    pub next_month: f64,
    pub trend: Trend,
    /// Integer percentage in `[80, 100]`.
    pub confidence: u32,
}

/// The atomic unit published to subscribers for one tick.
///
/// `readings` holds exactly one entry per registered device in registry
/// order, and `total_consumption` is their sum rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub total_consumption: f64,
    #[serde(rename = "devices")]
    pub readings: Vec<Reading>,
    /// Number of readings with status Critical or Warning.
    pub active_alerts: usize,
    /// Alerts raised during this tick only.
    pub alerts: Vec<Alert>,
    pub forecast: Forecast,
    /// System efficiency against the configured system baseline.
    pub efficiency: u32,
}

impl Snapshot {
    /// Returns the reading for `id`, if that device is registered.
    pub fn reading(&self, id: DeviceId) -> Option<&Reading> {
        self.readings.iter().find(|r| r.device.id == id)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | total={:>8.2} kWh  eff={:>3}% | active={} alerts={} | \
             next_hr={:.2}  next_day={:.2}  ({:?}, {}% conf)",
            self.timestamp.format("%H:%M:%S"),
            self.total_consumption,
            self.efficiency,
            self.active_alerts,
            self.alerts.len(),
            self.forecast.next_hour,
            self.forecast.next_day,
            self.forecast.trend,
            self.forecast.confidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        let now = Local::now();
        let device = Device::new(2, "Lighting", 25.0, 8.0);
        Snapshot {
            timestamp: now,
            total_consumption: 27.5,
            readings: vec![Reading {
                device,
                current_consumption: 27.5,
                status: DeviceStatus::Normal,
                efficiency: 91,
                last_update: now,
            }],
            active_alerts: 0,
            alerts: Vec::new(),
            forecast: Forecast {
                next_hour: 28.0,
                next_day: 680.0,
                next_month: 21000.0,
                trend: Trend::Increasing,
                confidence: 90,
            },
            efficiency: 77,
        }
    }

    #[test]
    fn zero_trend_is_decreasing() {
        assert_eq!(Trend::from_coefficient(0.0), Trend::Decreasing);
        assert_eq!(Trend::from_coefficient(0.01), Trend::Increasing);
        assert_eq!(Trend::from_coefficient(-0.01), Trend::Decreasing);
    }

    #[test]
    fn active_alert_statuses() {
        assert!(DeviceStatus::Critical.is_active_alert());
        assert!(DeviceStatus::Warning.is_active_alert());
        assert!(!DeviceStatus::Normal.is_active_alert());
        assert!(!DeviceStatus::Offline.is_active_alert());
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        assert!(json.get("totalConsumption").is_some());
        assert!(json.get("activeAlerts").is_some());
        let reading = &json["devices"][0];
        assert_eq!(reading["id"], 2);
        assert_eq!(reading["baseConsumption"], 25.0);
        assert_eq!(reading["currentConsumption"], 27.5);
        assert_eq!(reading["status"], "Normal");
        assert!(reading.get("lastUpdate").is_some());
        assert_eq!(json["forecast"]["trend"], "increasing");
        assert!(json["forecast"].get("nextMonth").is_some());
    }

    #[test]
    fn alert_kind_serializes_as_type() {
        let alert = Alert {
            id: "alert-4-1".into(),
            kind: AlertKind::Error,
            title: "High Consumption Alert".into(),
            message: "m".into(),
            timestamp: Local::now(),
            device_id: Some(DeviceId(4)),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["deviceId"], 4);
    }

    #[test]
    fn snapshot_display_does_not_panic() {
        let s = format!("{}", sample_snapshot());
        assert!(s.contains("total="));
    }

    #[test]
    fn reading_lookup_by_device() {
        let snapshot = sample_snapshot();
        assert!(snapshot.reading(DeviceId(2)).is_some());
        assert!(snapshot.reading(DeviceId(9)).is_none());
    }
}
