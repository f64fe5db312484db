//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when every dependency is up, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    /// Whether a dispatcher is subscribed to the notification bus.
    pub notifications: bool,
}

/// GET /health
///
/// Answers 200 when the database is reachable and 503 otherwise, so load
/// balancers can use it directly. A missing dispatcher only degrades the
/// report.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = eventhub_db::health_check(&state.pool).await.is_ok();
    let notifications = state.bus.subscriber_count() > 0;

    let code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let report = HealthReport {
        status: if database && notifications { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        notifications,
    };
    (code, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
