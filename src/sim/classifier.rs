//! Status classification and alert emission.

use chrono::{DateTime, Local};

use super::types::{Alert, AlertKind, DeviceStatus, Reading};

/// Ratio above which a reading is Critical (exclusive).
pub const CRITICAL_RATIO: f64 = 1.5;
/// Ratio above which a reading is Warning (exclusive).
pub const WARNING_RATIO: f64 = 1.2;
/// Ratio below which a reading is Offline (exclusive).
pub const OFFLINE_RATIO: f64 = 0.5;

/// Classifies a reading by `current / base`.
///
/// Bands are checked Critical, Warning, Offline in that order, so the upper
/// boundaries belong to the lower band: a ratio of exactly 1.5 is Warning and
/// exactly 1.2 is Normal.
///
/// # Examples
///
/// ```
/// use energy_telemetry::sim::classifier::classify;
/// use energy_telemetry::sim::types::DeviceStatus;
///
/// assert_eq!(classify(88.0, 80.0), DeviceStatus::Normal);
/// assert_eq!(classify(130.0, 80.0), DeviceStatus::Critical);
/// assert_eq!(classify(30.0, 80.0), DeviceStatus::Offline);
/// ```
pub fn classify(current: f64, base: f64) -> DeviceStatus {
    let ratio = current / base;
    if ratio > CRITICAL_RATIO {
        DeviceStatus::Critical
    } else if ratio > WARNING_RATIO {
        DeviceStatus::Warning
    } else if ratio < OFFLINE_RATIO {
        DeviceStatus::Offline
    } else {
        DeviceStatus::Normal
    }
}

/// Alert id unique per device per tick.
fn alert_id(reading: &Reading, at: &DateTime<Local>) -> String {
    format!("alert-{}-{}", reading.device.id, at.timestamp_millis())
}

/// Builds the alert a single reading raises, if any.
///
/// Critical readings raise an error alert, Offline readings a warning alert.
/// Normal and Warning readings raise nothing at this layer.
pub fn alert_for(reading: &Reading, at: DateTime<Local>) -> Option<Alert> {
    let device = &reading.device;
    match reading.status {
        DeviceStatus::Critical => {
            let above_pct =
                ((reading.current_consumption / device.base_consumption - 1.0) * 100.0).round();
            Some(Alert {
                id: alert_id(reading, &at),
                kind: AlertKind::Error,
                title: "High Consumption Alert".to_string(),
                message: format!(
                    "{} is consuming {} kWh ({}% above normal)",
                    device.name, reading.current_consumption, above_pct
                ),
                timestamp: at,
                device_id: Some(device.id),
            })
        }
        DeviceStatus::Offline => Some(Alert {
            id: alert_id(reading, &at),
            kind: AlertKind::Warning,
            title: "Device Offline".to_string(),
            message: format!(
                "{} appears to be offline or consuming very low power",
                device.name
            ),
            timestamp: at,
            device_id: Some(device.id),
        }),
        DeviceStatus::Normal | DeviceStatus::Warning => None,
    }
}

/// Collects alerts for a tick's readings, in reading order.
pub fn alerts_for(readings: &[Reading], at: DateTime<Local>) -> Vec<Alert> {
    readings.iter().filter_map(|r| alert_for(r, at)).collect()
}
