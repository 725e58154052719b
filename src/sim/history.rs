//! Synthetic historical series for chart backfill.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::diurnal;
use super::math::{centered_draw, round2};

/// Width of the uniform noise added to each point (`[-15, +15)`).
const NOISE_SPAN: f64 = 30.0;
/// Lower bound for any generated value.
pub const FLOOR_KWH: f64 = 50.0;

/// Requested granularity of a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Hour,
    Day,
    #[default]
    Week,
    Month,
}

impl Period {
    /// All periods in ascending span.
    pub const ALL: [Period; 4] = [Period::Hour, Period::Day, Period::Week, Period::Month];

    /// Number of points in the series.
    pub fn points(self) -> usize {
        match self {
            Self::Hour => 60,
            Self::Day => 24,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Spacing between consecutive points.
    pub fn spacing(self) -> Duration {
        match self {
            Self::Hour => Duration::minutes(1),
            Self::Day => Duration::minutes(60),
            Self::Week | Self::Month => Duration::minutes(24 * 60),
        }
    }

    /// Parses a period name, falling back to [`Period::Week`] for anything unknown.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Chart label for a point timestamp.
    fn label(self, at: &DateTime<Local>) -> String {
        match self {
            Self::Hour => at.format("%I:%M %p").to_string(),
            Self::Day => at.format("%I %p").to_string(),
            Self::Week => at.format("%a").to_string(),
            Self::Month => at.format("%-d").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        };
        f.write_str(s)
    }
}

/// Error returned when a period name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period \"{0}\", expected one of: hour, day, week, month")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

/// One point of a historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    /// Display label (clock time, weekday, or day of month).
    pub time: String,
    /// Consumption, floored at [`FLOOR_KWH`], two decimals.
    pub consumption: f64,
    pub timestamp: DateTime<Local>,
}

/// Generates a fresh series ending at `now`, oldest point first.
///
/// Every call draws new noise; nothing is cached or derived from live snapshots.
///
/// # Arguments
///
/// * `period` - Granularity; determines point count and spacing
/// * `base_load` - Load the diurnal multiplier is applied to
/// * `now` - Timestamp of the most recent point
/// * `rng` - Random source for the per-point noise
pub fn generate_historical_data<R: Rng + ?Sized>(
    period: Period,
    base_load: f64,
    now: DateTime<Local>,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let points = period.points();
    let spacing = period.spacing();

    (0..points)
        .rev()
        .map(|back| {
            let timestamp = now - spacing * back as i32;
            let shaped = base_load * diurnal::multiplier(timestamp.hour());
            let consumption = (shaped + centered_draw(rng, NOISE_SPAN)).max(FLOOR_KWH);
            HistoryPoint {
                time: period.label(&timestamp),
                consumption: round2(consumption),
                timestamp,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 11, 14, 30, 0)
            .single()
            .unwrap_or_else(Local::now)
    }

    #[test]
    fn point_counts_match_period() {
        let mut rng = StdRng::seed_from_u64(1);
        for period in Period::ALL {
            let series = generate_historical_data(period, 150.0, fixed_now(), &mut rng);
            assert_eq!(series.len(), period.points(), "{period}");
        }
    }

    #[test]
    fn series_is_oldest_first_and_ends_now() {
        let now = fixed_now();
        let series = generate_historical_data(Period::Day, 150.0, now, &mut StdRng::seed_from_u64(2));
        assert_eq!(series.last().map(|p| p.timestamp), Some(now));
        assert_eq!(series.first().map(|p| p.timestamp), Some(now - Duration::hours(23)));
        assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn values_are_floored() {
        let mut rng = StdRng::seed_from_u64(3);
        let series = generate_historical_data(Period::Month, 10.0, fixed_now(), &mut rng);
        assert!(series.iter().all(|p| p.consumption == FLOOR_KWH));
    }

    #[test]
    fn values_stay_near_shaped_load() {
        let mut rng = StdRng::seed_from_u64(4);
        let series = generate_historical_data(Period::Hour, 150.0, fixed_now(), &mut rng);
        for p in &series {
            let shaped = 150.0 * diurnal::multiplier(p.timestamp.hour());
            assert!(p.consumption >= FLOOR_KWH);
            assert!((p.consumption - shaped).abs() <= 15.01);
        }
    }

    #[test]
    fn parse_period_names() {
        assert_eq!("hour".parse::<Period>(), Ok(Period::Hour));
        assert_eq!(" Month ".parse::<Period>(), Ok(Period::Month));
        assert!("year".parse::<Period>().is_err());
        assert_eq!(Period::parse_or_default("year"), Period::Week);
        assert_eq!(Period::default(), Period::Week);
    }

    #[test]
    fn week_labels_are_weekdays() {
        let series =
            generate_historical_data(Period::Week, 150.0, fixed_now(), &mut StdRng::seed_from_u64(5));
        // 2026-03-11 is a Wednesday
        assert_eq!(series.last().map(|p| p.time.as_str()), Some("Wed"));
        assert_eq!(series.first().map(|p| p.time.as_str()), Some("Thu"));
    }
}
