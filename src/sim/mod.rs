//! Snapshot simulation: sampling, classification, aggregation, and history.

pub mod aggregate;
pub mod alert_log;
/// Status thresholds and alert construction.
pub mod classifier;
/// Time-of-day load shaping.
pub mod diurnal;
pub mod engine;
pub mod history;
pub mod math;
pub mod sampler;
pub mod types;

pub use alert_log::AlertLog;
pub use engine::TelemetryEngine;
pub use history::{HistoryPoint, Period};
pub use types::{Alert, AlertKind, DeviceStatus, Forecast, Reading, Snapshot, Trend};
