//! Error types.

use classroom_id::{RoomId, SessionId};
use thiserror::Error;

/// A user action on the schedule was rejected. No state was changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Rooms cannot be deleted while a session occupies them.
    #[error("room {0} is in use and cannot be deleted")]
    RoomInUse(RoomId),

    #[error("room {room} is already occupied by session {session}")]
    RoomOccupied { room: RoomId, session: SessionId },

    #[error("room {0} is under maintenance")]
    RoomUnavailable(RoomId),

    #[error("session {0} has expired")]
    SessionExpired(SessionId),

    #[error("invalid room URL '{url}': {reason}")]
    InvalidRoomUrl { url: String, reason: String },

    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error("session must not end before it starts")]
    InvalidWindow,

    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

/// An inventory handed to [`Schedule::from_inventory`](crate::Schedule::from_inventory)
/// is internally inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("duplicate session id: {0}")]
    DuplicateSession(SessionId),

    #[error("duplicate room id: {0}")]
    DuplicateRoom(RoomId),

    #[error("room {0} is in use but has no occupant")]
    InUseWithoutOccupant(RoomId),

    #[error("room {room} is {status} but lists occupant {session}")]
    UnexpectedOccupant {
        room: RoomId,
        status: &'static str,
        session: SessionId,
    },

    #[error("room {room} references unknown session {session}")]
    UnknownSession { room: RoomId, session: SessionId },

    #[error("session {session} references unknown room {room}")]
    UnknownRoom { session: SessionId, room: RoomId },

    /// Session and room disagree about who holds whom.
    #[error("session {session} and room {room} disagree on occupancy")]
    OccupancyMismatch { session: SessionId, room: RoomId },

    #[error("session {0} ends before it starts")]
    InvalidWindow(SessionId),

    #[error("room {room}: {source}")]
    InvalidRoom {
        room: RoomId,
        #[source]
        source: ScheduleError,
    },
}
