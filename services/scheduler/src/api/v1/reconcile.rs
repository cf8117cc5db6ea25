//! On-demand reconciliation.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use tracing::info;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/reconcile", post(run_pass))
}

/// Runs a pass immediately and returns its report.
async fn run_pass(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.store().reconcile().await;
    if report.changed() {
        info!(
            trigger = "api",
            sessions_expired = report.sessions_expired,
            rooms_released = report.rooms_released,
            rooms_assigned = report.rooms_assigned,
            "Reconciliation pass complete"
        );
    }
    Json(report)
}
