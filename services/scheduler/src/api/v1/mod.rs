//! API v1 routes.

mod reconcile;
mod rooms;
mod sessions;

use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/sessions", sessions::routes())
        .nest("/rooms", rooms::routes())
        .merge(reconcile::routes())
}
