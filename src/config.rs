//! TOML-based engine configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::devices::{Device, DeviceRegistry};
use crate::error::EngineError;
use crate::sim::engine::DEFAULT_SYSTEM_BASE;

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 2000;

/// Top-level engine configuration parsed from TOML.
///
/// All fields have defaults matching the `office` preset. Load from TOML
/// with [`EngineConfig::from_toml_file`] or use [`EngineConfig::office`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Timing, seeding, and system baselines.
    #[serde(default)]
    pub engine: EngineSection,
    /// Device registry, in publication order.
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
}

/// Timing, seeding, and system baselines.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    /// Tick period in milliseconds (must be > 0).
    pub tick_ms: u64,
    /// Random seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Baseline the system efficiency figure is measured against.
    pub system_base_consumption: f64,
    /// Base load shaped by the historical series generator.
    pub history_base_load: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            seed: None,
            system_base_consumption: DEFAULT_SYSTEM_BASE,
            history_base_load: DEFAULT_SYSTEM_BASE,
        }
    }
}

/// One `[[devices]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: u32,
    pub name: String,
    /// Expected steady-state consumption (kWh, > 0).
    pub base_consumption: f64,
    /// Peak-to-peak random deviation (kWh, >= 0).
    #[serde(default)]
    pub variance: f64,
}

impl From<&Device> for DeviceConfig {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.0,
            name: d.name.clone(),
            base_consumption: d.base_consumption,
            variance: d.variance,
        }
    }
}

fn default_devices() -> Vec<DeviceConfig> {
    DeviceRegistry::default_devices()
        .iter()
        .map(DeviceConfig::from)
        .collect()
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"engine.tick_ms"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::office()
    }
}

impl EngineConfig {
    /// The built-in five-device office profile.
    pub fn office() -> Self {
        Self {
            engine: EngineSection::default(),
            devices: default_devices(),
        }
    }

    /// Plant-floor profile: heavier process loads and a higher system baseline.
    pub fn factory() -> Self {
        Self {
            engine: EngineSection {
                system_base_consumption: 420.0,
                history_base_load: 420.0,
                ..EngineSection::default()
            },
            devices: vec![
                DeviceConfig::from(&Device::new(1, "HVAC System", 90.0, 25.0)),
                DeviceConfig::from(&Device::new(2, "Lighting", 40.0, 10.0)),
                DeviceConfig::from(&Device::new(3, "Compressors", 110.0, 40.0)),
                DeviceConfig::from(&Device::new(4, "Manufacturing", 160.0, 60.0)),
                DeviceConfig::from(&Device::new(5, "Security System", 12.0, 3.0)),
            ],
        }
    }

    /// Low-occupancy profile with a faster tick for demos.
    pub fn night_shift() -> Self {
        Self {
            engine: EngineSection {
                tick_ms: 1000,
                system_base_consumption: 90.0,
                history_base_load: 90.0,
                ..EngineSection::default()
            },
            devices: vec![
                DeviceConfig::from(&Device::new(1, "HVAC System", 30.0, 10.0)),
                DeviceConfig::from(&Device::new(2, "Lighting", 10.0, 4.0)),
                DeviceConfig::from(&Device::new(5, "Security System", 8.0, 3.0)),
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["office", "factory", "night_shift"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "office" => Ok(Self::office()),
            "factory" => Ok(Self::factory()),
            "night_shift" => Ok(Self::night_shift()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Tick period as a `Duration`.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.engine.tick_ms)
    }

    /// Device records in configured order.
    pub fn device_list(&self) -> Vec<Device> {
        self.devices
            .iter()
            .map(|d| Device::new(d.id, d.name.clone(), d.base_consumption, d.variance))
            .collect()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let e = &self.engine;

        if e.tick_ms == 0 {
            errors.push(ConfigError::new("engine.tick_ms", "must be > 0"));
        }
        if !e.system_base_consumption.is_finite() || e.system_base_consumption <= 0.0 {
            errors.push(ConfigError::new(
                "engine.system_base_consumption",
                "must be a positive number",
            ));
        }
        if !e.history_base_load.is_finite() || e.history_base_load < 0.0 {
            errors.push(ConfigError::new(
                "engine.history_base_load",
                "must be a non-negative number",
            ));
        }

        if self.devices.is_empty() {
            errors.push(ConfigError::new("devices", "at least one device is required"));
        }

        let mut seen = HashSet::new();
        for (i, d) in self.devices.iter().enumerate() {
            if !seen.insert(d.id) {
                errors.push(ConfigError::new(
                    format!("devices[{i}].id"),
                    format!("duplicate device id {}", d.id),
                ));
            }
            if d.name.trim().is_empty() {
                errors.push(ConfigError::new(format!("devices[{i}].name"), "must not be empty"));
            }
            if !d.base_consumption.is_finite() || d.base_consumption <= 0.0 {
                errors.push(ConfigError::new(
                    format!("devices[{i}].base_consumption"),
                    "must be > 0",
                ));
            }
            if !d.variance.is_finite() || d.variance < 0.0 {
                errors.push(ConfigError::new(format!("devices[{i}].variance"), "must be >= 0"));
            }
        }

        errors
    }

    /// Validates and converts the error list into an [`EngineError`].
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` carrying every validation failure.
    pub fn ensure_valid(&self) -> Result<(), EngineError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Config(errors))
        }
    }
}
