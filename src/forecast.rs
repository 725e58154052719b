//! Short-horizon consumption forecasting.

use rand::Rng;

use crate::sim::math::{centered_draw, round2};
use crate::sim::types::{Forecast, Trend};

/// Full width of the per-tick trend draw; the coefficient lands in `[-0.05, +0.05)`.
const TREND_SPAN: f64 = 0.1;
/// Lowest confidence fraction reported.
const CONFIDENCE_FLOOR: f64 = 0.8;
/// Width of the confidence band above the floor.
const CONFIDENCE_SPAN: f64 = 0.2;

/// Trend-scaled forecaster over the current system total.
///
/// Each horizon scales the same trend coefficient by a growing factor
/// (1x hour, 2x day, 3x month) instead of compounding hour into day into
/// month; `next_month` is built from the rounded `next_day`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendForecast;

impl TrendForecast {
    /// Produces a forecast with a fresh trend and confidence drawn from `rng`.
    ///
    /// # Arguments
    ///
    /// * `total` - Current system consumption
    /// * `rng` - Random source for the trend and confidence draws
    pub fn forecast<R: Rng + ?Sized>(&self, total: f64, rng: &mut R) -> Forecast {
        let trend = centered_draw(rng, TREND_SPAN);
        let confidence_draw = rng.random::<f64>();
        self.forecast_with(total, trend, confidence_draw)
    }

    /// Deterministic core: forecast for an explicit trend coefficient and confidence draw.
    ///
    /// # Arguments
    ///
    /// * `total` - Current system consumption
    /// * `trend` - Trend coefficient, nominally in `[-0.05, +0.05]`
    /// * `confidence_draw` - Uniform sample in `[0, 1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_telemetry::forecast::TrendForecast;
    /// use energy_telemetry::sim::types::Trend;
    ///
    /// let f = TrendForecast.forecast_with(100.0, 0.0, 0.5);
    /// assert_eq!(f.next_hour, 100.0);
    /// assert_eq!(f.next_day, 2400.0);
    /// assert_eq!(f.next_month, 72000.0);
    /// assert_eq!(f.trend, Trend::Decreasing);
    /// assert_eq!(f.confidence, 90);
    /// ```
    pub fn forecast_with(&self, total: f64, trend: f64, confidence_draw: f64) -> Forecast {
        let next_hour = round2(total * (1.0 + trend));
        let next_day = round2(total * 24.0 * (1.0 + trend * 2.0));
        let next_month = round2(next_day * 30.0 * (1.0 + trend * 3.0));
        let confidence = ((CONFIDENCE_FLOOR + confidence_draw * CONFIDENCE_SPAN) * 100.0).round();

        Forecast {
            next_hour,
            next_day,
            next_month,
            trend: Trend::from_coefficient(trend),
            confidence: confidence as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn horizons_scale_trend_independently() {
        let f = TrendForecast.forecast_with(200.0, 0.05, 0.0);
        assert_relative_eq!(f.next_hour, 210.0);
        assert_relative_eq!(f.next_day, 5280.0);
        assert_relative_eq!(f.next_month, round2(5280.0 * 30.0 * 1.15));
        assert_eq!(f.trend, Trend::Increasing);
        assert_eq!(f.confidence, 80);
    }

    #[test]
    fn negative_trend_is_decreasing() {
        let f = TrendForecast.forecast_with(200.0, -0.03, 0.999);
        assert_eq!(f.trend, Trend::Decreasing);
        assert!(f.next_hour < 200.0);
        assert_eq!(f.confidence, 100);
    }

    #[test]
    fn random_forecast_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let f = TrendForecast.forecast(150.0, &mut rng);
            assert!((80..=100).contains(&f.confidence));
            assert!(f.next_hour >= 150.0 * 0.95 - 0.01);
            assert!(f.next_hour <= 150.0 * 1.05 + 0.01);
        }
    }

    #[test]
    fn zero_total_forecasts_zero() {
        let f = TrendForecast.forecast_with(0.0, 0.02, 0.5);
        assert_eq!(f.next_hour, 0.0);
        assert_eq!(f.next_day, 0.0);
        assert_eq!(f.next_month, 0.0);
    }
}
