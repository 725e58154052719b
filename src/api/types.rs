//! API query and response types.

use serde::{Deserialize, Serialize};

use crate::devices::Device;
use crate::sim::alert_log::AlertLog;
use crate::sim::types::Alert;

/// Query parameters for `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// `hour`, `day`, `week`, or `month`; defaults to `week` when absent.
    pub period: Option<String>,
}

/// Registry listing for `GET /devices`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
    pub base_consumption: f64,
}

/// Alert log listing for `GET /alerts`, newest first.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
}

impl From<&AlertLog> for AlertsResponse {
    fn from(log: &AlertLog) -> Self {
        Self {
            alerts: log.iter().cloned().collect(),
        }
    }
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
