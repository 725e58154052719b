//! Fixed, ordered registry of simulated devices.

use std::collections::HashSet;

use super::types::{Device, DeviceId};
use crate::error::{EngineError, Result};

/// Read-only, ordered set of devices established at engine construction.
///
/// Registry order is the order readings appear in every snapshot.
///
/// # Examples
///
/// ```
/// use energy_telemetry::devices::{Device, DeviceRegistry};
///
/// let registry = DeviceRegistry::new(vec![
///     Device::new(1, "Lighting", 25.0, 8.0),
///     Device::new(2, "Computers", 35.0, 12.0),
/// ])
/// .unwrap();
/// assert_eq!(registry.len(), 2);
/// assert_eq!(registry.base_consumption(), 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Builds a registry, rejecting empty lists, duplicate ids, and invalid records.
    ///
    /// # Errors
    ///
    /// * [`EngineError::EmptyRegistry`] if `devices` is empty
    /// * [`EngineError::DuplicateDevice`] if two devices share an id
    /// * [`EngineError::InvalidDevice`] if a base consumption or variance is out of range
    pub fn new(devices: Vec<Device>) -> Result<Self> {
        if devices.is_empty() {
            return Err(EngineError::EmptyRegistry);
        }

        let mut seen = HashSet::with_capacity(devices.len());
        for device in &devices {
            if !seen.insert(device.id) {
                return Err(EngineError::DuplicateDevice(device.id));
            }
            if let Some(reason) = device.invalid_reason() {
                return Err(EngineError::InvalidDevice {
                    id: device.id,
                    reason,
                });
            }
        }

        Ok(Self { devices })
    }

    /// The built-in five-device office/plant profile.
    pub fn default_devices() -> Vec<Device> {
        vec![
            Device::new(1, "HVAC System", 45.0, 15.0),
            Device::new(2, "Lighting", 25.0, 8.0),
            Device::new(3, "Computers", 35.0, 12.0),
            Device::new(4, "Manufacturing", 80.0, 25.0),
            Device::new(5, "Security System", 8.0, 3.0),
        ]
    }

    /// Iterates devices in registry order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Device> {
        self.devices.iter()
    }

    /// Devices as a slice, in registry order.
    pub fn as_slice(&self) -> &[Device] {
        &self.devices
    }

    /// Looks up a device by id.
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Number of registered devices. Never zero.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Always `false`; construction rejects empty registries.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Sum of all baseline consumptions.
    pub fn base_consumption(&self) -> f64 {
        self.devices.iter().map(|d| d.base_consumption).sum()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self {
            devices: Self::default_devices(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_five_devices_in_order() {
        let registry = DeviceRegistry::default();
        let ids: Vec<u32> = registry.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(registry.base_consumption(), 193.0);
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(matches!(
            DeviceRegistry::new(Vec::new()),
            Err(EngineError::EmptyRegistry)
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = DeviceRegistry::new(vec![
            Device::new(7, "A", 10.0, 1.0),
            Device::new(7, "B", 12.0, 1.0),
        ]);
        assert!(matches!(result, Err(EngineError::DuplicateDevice(DeviceId(7)))));
    }

    #[test]
    fn invalid_device_is_rejected() {
        let result = DeviceRegistry::new(vec![Device::new(3, "Broken", -5.0, 1.0)]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidDevice { id: DeviceId(3), .. })
        ));
    }

    #[test]
    fn lookup_by_id() {
        let registry = DeviceRegistry::default();
        assert_eq!(
            registry.get(DeviceId(4)).map(|d| d.name.as_str()),
            Some("Manufacturing")
        );
        assert!(registry.get(DeviceId(99)).is_none());
    }
}
