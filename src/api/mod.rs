//! REST API over a running hub.
//!
//! Routes:
//! - `GET /snapshot` latest published snapshot
//! - `GET /history?period=<p>` freshly generated historical series
//! - `GET /devices` device registry
//! - `GET /alerts`, `DELETE /alerts/{id}` rolling alert log

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Weak};

use axum::Router;
use axum::routing::{delete, get};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::pubsub::{Hub, Subscription};
use crate::sim::alert_log::AlertLog;
use crate::sim::types::Snapshot;

pub use types::{AlertsResponse, DevicesResponse, ErrorResponse, HistoryQuery};

/// State shared by all request handlers.
///
/// Fed by a hub subscription: every tick replaces the cached snapshot and
/// appends that tick's alerts to the log.
pub struct AppState {
    hub: Hub,
    latest: RwLock<Option<Arc<Snapshot>>>,
    alerts: Mutex<AlertLog>,
}

impl AppState {
    /// Creates the state and subscribes it to `hub`.
    ///
    /// The returned subscription keeps the hub Active; unsubscribe it to stop
    /// the feed.
    pub fn attach(hub: Hub) -> (Arc<Self>, Subscription) {
        let state = Arc::new(Self {
            hub: hub.clone(),
            latest: RwLock::new(None),
            alerts: Mutex::new(AlertLog::new()),
        });
        let weak: Weak<Self> = Arc::downgrade(&state);
        let subscription = hub.subscribe(move |snapshot| {
            if let Some(state) = weak.upgrade() {
                state.record(snapshot);
            }
        });
        (state, subscription)
    }

    fn record(&self, snapshot: Arc<Snapshot>) {
        self.alerts.lock().record_all(&snapshot.alerts);
        *self.latest.write() = Some(snapshot);
    }

    /// Most recently received snapshot, if any tick has fired.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.read().clone()
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/history", get(handlers::get_history))
        .route("/devices", get(handlers::get_devices))
        .route("/alerts", get(handlers::get_alerts))
        .route("/alerts/{id}", delete(handlers::dismiss_alert))
        .with_state(state)
}

/// Binds to `addr` and serves the API until Ctrl-C.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
