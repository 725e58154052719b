//! CSV export for snapshot readings and historical series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::sim::history::HistoryPoint;
use crate::sim::types::Snapshot;

/// Column header for per-tick device readings.
pub const READINGS_HEADER: [&str; 8] = [
    "timestamp",
    "device_id",
    "name",
    "base_kwh",
    "consumption_kwh",
    "status",
    "efficiency_pct",
    "total_kwh",
];

/// Column header for a historical series.
pub const HISTORY_HEADER: [&str; 3] = ["timestamp", "label", "consumption_kwh"];

/// Writes one row per reading across all `snapshots`, in tick then registry order.
///
/// # Errors
///
/// Returns `EngineError::Export` if a record cannot be written.
pub fn write_readings_csv(snapshots: &[Snapshot], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(READINGS_HEADER)?;

    for snapshot in snapshots {
        let timestamp = snapshot.timestamp.to_rfc3339();
        let total = format!("{:.2}", snapshot.total_consumption);
        for r in &snapshot.readings {
            wtr.write_record([
                timestamp.clone(),
                r.device.id.to_string(),
                r.device.name.clone(),
                format!("{:.2}", r.device.base_consumption),
                format!("{:.2}", r.current_consumption),
                r.status.to_string(),
                r.efficiency.to_string(),
                total.clone(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per historical point, oldest first.
///
/// # Errors
///
/// Returns `EngineError::Export` if a record cannot be written.
pub fn write_history_csv(points: &[HistoryPoint], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HISTORY_HEADER)?;

    for p in points {
        wtr.write_record([
            p.timestamp.to_rfc3339(),
            p.time.clone(),
            format!("{:.2}", p.consumption),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports readings to a CSV file at `path`.
///
/// # Errors
///
/// Returns `EngineError::Io` if the file cannot be created, or
/// `EngineError::Export` if writing fails.
pub fn export_readings(snapshots: &[Snapshot], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_readings_csv(snapshots, io::BufWriter::new(file))
}

/// Exports a historical series to a CSV file at `path`.
///
/// # Errors
///
/// Returns `EngineError::Io` if the file cannot be created, or
/// `EngineError::Export` if writing fails.
pub fn export_history(points: &[HistoryPoint], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_history_csv(points, io::BufWriter::new(file))
}
