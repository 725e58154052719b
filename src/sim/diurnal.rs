//! Coarse time-of-day load curve.

/// Load band an hour of the day falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiurnalBand {
    /// 06:00–08:59.
    MorningPeak,
    /// 09:00–17:59.
    WorkHours,
    /// 18:00–20:59.
    EveningPeak,
    /// Everything else.
    OffHours,
}

impl DiurnalBand {
    /// Classifies an hour of day (0–23). Hours outside that range count as off-hours.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=8 => Self::MorningPeak,
            9..=17 => Self::WorkHours,
            18..=20 => Self::EveningPeak,
            _ => Self::OffHours,
        }
    }

    /// Scaling factor applied to baseline consumption in this band.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::MorningPeak => 1.3,
            Self::WorkHours => 1.1,
            Self::EveningPeak => 1.2,
            Self::OffHours => 0.7,
        }
    }
}

/// Diurnal multiplier for an hour of day.
pub fn multiplier(hour: u32) -> f64 {
    DiurnalBand::for_hour(hour).multiplier()
}
