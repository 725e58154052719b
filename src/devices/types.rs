//! Common types for simulated devices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a simulated device.
///
/// Alerts carry this as a lookup key only; they never own the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A simulated consumer with a steady-state draw and a noise envelope.
///
/// Immutable reference data: created once when the registry is built and
/// never changed afterwards.
///
/// # Examples
///
/// ```
/// use energy_telemetry::devices::Device;
///
/// let press = Device::new(4, "Manufacturing", 80.0, 25.0);
/// assert_eq!(press.id.0, 4);
/// assert_eq!(press.half_variance(), 12.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Registry identity.
    pub id: DeviceId,
    /// Human-readable label used in alert messages.
    pub name: String,
    /// Expected steady-state consumption (kWh per reading).
    pub base_consumption: f64,
    /// Peak-to-peak amplitude of the random deviation applied each tick.
    pub variance: f64,
}

impl Device {
    /// Creates a device record.
    pub fn new(id: u32, name: impl Into<String>, base_consumption: f64, variance: f64) -> Self {
        Self {
            id: DeviceId(id),
            name: name.into(),
            base_consumption,
            variance,
        }
    }

    /// Largest absolute deviation a single draw can produce.
    pub fn half_variance(&self) -> f64 {
        self.variance / 2.0
    }

    /// Returns a description of the first constraint this record violates, if any.
    pub(crate) fn invalid_reason(&self) -> Option<String> {
        if !self.base_consumption.is_finite() || self.base_consumption <= 0.0 {
            return Some(format!(
                "base consumption must be a positive number, got {}",
                self.base_consumption
            ));
        }
        if !self.variance.is_finite() || self.variance < 0.0 {
            return Some(format!(
                "variance must be a non-negative number, got {}",
                self.variance
            ));
        }
        None
    }
}
