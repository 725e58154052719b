//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::types::{AlertsResponse, DevicesResponse, ErrorResponse, HistoryQuery};
use crate::sim::history::Period;

/// `GET /snapshot` → 200 + latest snapshot, or 404 before the first tick.
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Response {
    match state.latest() {
        Some(snapshot) => Json(snapshot.as_ref().clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no snapshot has been published yet")),
        )
            .into_response(),
    }
}

/// `GET /history?period=<p>` → 200 + series, 400 on an unknown period.
///
/// A missing `period` yields the default weekly series.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let period = match query.period.as_deref().map(str::parse::<Period>) {
        None => Period::default(),
        Some(Ok(period)) => period,
        Some(Err(err)) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(err.to_string())))
                .into_response();
        }
    };
    Json(state.hub().generate_historical_data(period)).into_response()
}

/// `GET /devices` → 200 + registry in registration order.
pub async fn get_devices(State(state): State<Arc<AppState>>) -> Json<DevicesResponse> {
    let registry = state.hub().registry();
    Json(DevicesResponse {
        base_consumption: registry.base_consumption(),
        devices: registry.as_slice().to_vec(),
    })
}

/// `GET /alerts` → 200 + alert log, newest first.
pub async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<AlertsResponse> {
    Json(AlertsResponse::from(&*state.alerts.lock()))
}

/// `DELETE /alerts/{id}` → 204, or 404 if the id is not in the log.
pub async fn dismiss_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.alerts.lock().dismiss(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
