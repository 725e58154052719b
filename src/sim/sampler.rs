//! Per-device reading generation.

use chrono::{DateTime, Local, Timelike};
use rand::Rng;

use super::classifier::classify;
use super::diurnal;
use super::math::{centered_draw, efficiency_pct, round2};
use super::types::Reading;
use crate::devices::Device;

/// Unrounded consumption `max(0, (base + variance) * multiplier)`.
pub fn raw_consumption_kwh(device: &Device, variance: f64, multiplier: f64) -> f64 {
    ((device.base_consumption + variance) * multiplier).max(0.0)
}

/// [`raw_consumption_kwh`] rounded to two decimals.
pub fn consumption_kwh(device: &Device, variance: f64, multiplier: f64) -> f64 {
    round2(raw_consumption_kwh(device, variance, multiplier))
}

/// Builds a reading from an already-computed consumption value.
///
/// Status and efficiency are derived here so they stay a pure function of
/// `(consumption, base)`.
pub fn reading_from_consumption(device: &Device, consumption: f64, at: DateTime<Local>) -> Reading {
    Reading {
        device: device.clone(),
        current_consumption: consumption,
        status: classify(consumption, device.base_consumption),
        efficiency: efficiency_pct(device.base_consumption, consumption),
        last_update: at,
    }
}

/// Builds a reading from unrounded consumption.
///
/// The reported consumption and the status use the two-decimal value;
/// efficiency is taken from the unrounded value. A reading that rounds to
/// zero reports zero efficiency.
pub fn reading_from_raw(device: &Device, raw: f64, at: DateTime<Local>) -> Reading {
    let consumption = round2(raw);
    let efficiency = if consumption > 0.0 {
        efficiency_pct(device.base_consumption, raw)
    } else {
        0
    };
    Reading {
        device: device.clone(),
        current_consumption: consumption,
        status: classify(consumption, device.base_consumption),
        efficiency,
        last_update: at,
    }
}

/// Generates one reading for `device` at hour-of-day `hour`.
///
/// The variance is drawn uniformly from `[-variance/2, +variance/2]`.
pub fn generate_reading<R: Rng + ?Sized>(
    device: &Device,
    hour: u32,
    at: DateTime<Local>,
    rng: &mut R,
) -> Reading {
    let variance = centered_draw(rng, device.variance);
    let raw = raw_consumption_kwh(device, variance, diurnal::multiplier(hour));
    reading_from_raw(device, raw, at)
}

/// Generates readings for every device in order, all stamped with `at`.
pub fn generate_readings<'a, R: Rng + ?Sized>(
    devices: impl IntoIterator<Item = &'a Device>,
    at: DateTime<Local>,
    rng: &mut R,
) -> Vec<Reading> {
    let hour = at.hour();
    devices
        .into_iter()
        .map(|device| generate_reading(device, hour, at, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::sim::types::DeviceStatus;

    fn press() -> Device {
        Device::new(4, "Manufacturing", 80.0, 25.0)
    }

    #[test]
    fn work_hours_with_zero_variance() {
        let device = press();
        let consumption = consumption_kwh(&device, 0.0, diurnal::multiplier(14));
        assert_eq!(consumption, 88.0);

        let reading = reading_from_consumption(&device, consumption, Local::now());
        assert_eq!(reading.efficiency, 91);
        assert_eq!(reading.status, DeviceStatus::Normal);
    }

    #[test]
    fn consumption_is_floored_at_zero() {
        let device = Device::new(9, "Tiny", 1.0, 10.0);
        assert_eq!(consumption_kwh(&device, -5.0, 1.3), 0.0);
    }

    #[test]
    fn zero_consumption_has_zero_efficiency() {
        let device = Device::new(9, "Tiny", 1.0, 10.0);
        let reading = reading_from_consumption(&device, 0.0, Local::now());
        assert_eq!(reading.efficiency, 0);
        assert_eq!(reading.status, DeviceStatus::Offline);
    }

    #[test]
    fn efficiency_uses_unrounded_consumption() {
        let device = Device::new(7, "Pump", 1.0, 0.0);
        let reading = reading_from_raw(&device, 0.6666, Local::now());
        assert_eq!(reading.current_consumption, 0.67);
        // 1 / 0.6666 rounds to 150; 1 / 0.67 would give 149
        assert_eq!(reading.efficiency, 150);
        assert_eq!(reading.status, DeviceStatus::Normal);
    }

    #[test]
    fn raw_rounding_to_zero_has_zero_efficiency() {
        let device = Device::new(7, "Pump", 1.0, 0.0);
        let reading = reading_from_raw(&device, 0.004, Local::now());
        assert_eq!(reading.current_consumption, 0.0);
        assert_eq!(reading.efficiency, 0);
        assert_eq!(reading.status, DeviceStatus::Offline);
    }

    #[test]
    fn generated_reading_matches_raw_path() {
        let device = press();
        let at = Local::now();
        let mut rng = StdRng::seed_from_u64(5);
        let generated = generate_reading(&device, 14, at, &mut rng);

        let mut rng = StdRng::seed_from_u64(5);
        let variance = centered_draw(&mut rng, device.variance);
        let raw = raw_consumption_kwh(&device, variance, diurnal::multiplier(14));
        assert_eq!(generated.current_consumption, round2(raw));
        assert_eq!(generated.efficiency, efficiency_pct(device.base_consumption, raw));
    }

    #[test]
    fn generated_reading_stays_within_envelope() {
        let device = press();
        let mut rng = StdRng::seed_from_u64(42);
        for hour in 0..24 {
            let m = diurnal::multiplier(hour);
            let reading = generate_reading(&device, hour, Local::now(), &mut rng);
            let lo = (device.base_consumption - device.half_variance()) * m;
            let hi = (device.base_consumption + device.half_variance()) * m;
            assert!(reading.current_consumption >= lo - 0.01);
            assert!(reading.current_consumption <= hi + 0.01);
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let devices = crate::devices::DeviceRegistry::default_devices();
        let at = Local::now();
        let a = generate_readings(&devices, at, &mut StdRng::seed_from_u64(1));
        let b = generate_readings(&devices, at, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
