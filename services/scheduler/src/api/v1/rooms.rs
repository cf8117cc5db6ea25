//! Meeting-room endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use classroom_id::RoomId;
use classroom_reconcile::RoomStatus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::state::AppState;
use crate::store::RoomEntry;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/{room_id}", delete(delete_room))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    /// Meeting link; must be an absolute http(s) URL.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: RoomStatus,
    pub occupant: Option<String>,
    pub last_released_at: Option<DateTime<Utc>>,
    /// False while the room is under maintenance or its session has expired.
    pub joinable: bool,
}

impl From<RoomEntry> for RoomResponse {
    fn from(entry: RoomEntry) -> Self {
        let RoomEntry { room, joinable } = entry;
        Self {
            id: room.id.to_string(),
            name: room.name,
            url: room.url,
            status: room.status,
            occupant: room.occupant.map(|id| id.to_string()),
            last_released_at: room.last_released_at,
            joinable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListRoomsResponse {
    pub items: Vec<RoomResponse>,
}

pub(super) fn parse_room_id(raw: &str) -> Result<RoomId, ApiError> {
    raw.parse().map_err(|e| ApiError::invalid_id("room_id", e))
}

async fn list_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let items = state
        .store()
        .rooms()
        .await
        .into_iter()
        .map(RoomResponse::from)
        .collect();
    Json(ListRoomsResponse { items })
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state.store().add_room(req.name, &req.url).await?;
    info!(room_id = %room.id, name = %room.name, "Room added");
    state.wake_scheduler();

    let response = RoomResponse::from(RoomEntry {
        room,
        joinable: true,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let room_id = parse_room_id(&room_id)?;
    let room = state.store().delete_room(&room_id).await?;
    info!(room_id = %room.id, name = %room.name, "Room deleted");
    state.wake_scheduler();

    Ok(StatusCode::NO_CONTENT)
}
