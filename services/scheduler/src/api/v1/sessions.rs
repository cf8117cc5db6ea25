//! Class-session endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use classroom_id::SessionId;
use classroom_reconcile::{Session, SessionStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::rooms::parse_room_id;
use crate::api::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/{session_id}/room", put(assign_room))
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoomRequest {
    pub room_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SessionStatus,
    pub room_id: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id.to_string(),
            name: session.name,
            start: session.start,
            end: session.end,
            status: session.status,
            room_id: session.room_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSessionsResponse {
    pub items: Vec<SessionResponse>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub session_id: String,
    pub room_id: String,
}

async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let items = state
        .store()
        .sessions()
        .await
        .into_iter()
        .map(SessionResponse::from)
        .collect();
    Json(ListSessionsResponse { items })
}

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .store()
        .add_session(req.name, req.start, req.end)
        .await?;
    info!(session_id = %session.id, start = %session.start, "Session created");
    state.wake_scheduler();

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// Manually assigns a room, bypassing the greedy pass for this session.
async fn assign_room(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AssignRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id: SessionId = session_id
        .parse()
        .map_err(|e| ApiError::invalid_id("session_id", e))?;
    let room_id = parse_room_id(&req.room_id)?;

    let assignment = state.store().assign_room(session_id, room_id).await?;
    info!(%session_id, %room_id, "Room assigned manually");
    state.wake_scheduler();

    Ok(Json(AssignmentResponse {
        session_id: assignment.session_id.to_string(),
        room_id: assignment.room_id.to_string(),
    }))
}
