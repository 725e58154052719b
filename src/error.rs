//! Error types shared by the engine, scheduler, and export paths.

use thiserror::Error;

use crate::config::ConfigError;
use crate::devices::DeviceId;

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced to the embedding application.
///
/// Everything here is a construction-time rejection or an export failure;
/// snapshot generation itself never fails.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("device registry is empty; at least one device is required")]
    EmptyRegistry,
    #[error("device id {0} is registered more than once")]
    DuplicateDevice(DeviceId),
    #[error("device {id} is invalid: {reason}")]
    InvalidDevice { id: DeviceId, reason: String },
    #[error("tick period must be greater than zero")]
    InvalidTickPeriod,
    #[error("no tokio runtime is available to drive the tick timer")]
    NoRuntime,
    #[error("invalid configuration: {}", join_config_errors(.0))]
    Config(Vec<ConfigError>),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
