//! File output for readings and historical series.

pub mod export;

pub use export::{export_history, export_readings, write_history_csv, write_readings_csv};
