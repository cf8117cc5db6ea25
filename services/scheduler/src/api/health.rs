//! Health check endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// A pass older than this many intervals marks the service degraded.
const STALE_PASS_INTERVALS: u32 = 3;

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerHealth>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct SchedulerHealth {
    pub status: String,
    pub last_pass_at: Option<DateTime<Utc>>,
    pub interval_secs: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/livez", get(livez))
}

fn response(status: &str, scheduler: Option<SchedulerHealth>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: "room-scheduler".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        scheduler,
    }
}

async fn healthz() -> impl IntoResponse {
    Json(response("ok", None))
}

/// Ready once a pass has run recently enough.
async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let interval = state.reconcile_interval();
    let last_pass_at = state.store().last_pass().await.map(|report| report.at);

    let max_age = interval
        .checked_mul(STALE_PASS_INTERVALS)
        .and_then(|age| chrono::Duration::from_std(age).ok())
        .unwrap_or(chrono::Duration::MAX);
    let fresh = last_pass_at.is_some_and(|at| state.store().now() - at <= max_age);

    let scheduler = SchedulerHealth {
        status: if fresh { "ok" } else { "stale" }.to_string(),
        last_pass_at,
        interval_secs: interval.as_secs(),
    };

    if fresh {
        (StatusCode::OK, Json(response("ok", Some(scheduler))))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(response("degraded", Some(scheduler))),
        )
    }
}

async fn livez() -> impl IntoResponse {
    StatusCode::OK
}
