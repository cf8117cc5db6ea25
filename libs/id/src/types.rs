//! Identifier types for scheduler resources.

use crate::define_id;

define_id!(
    /// Identifies a scheduled class session.
    SessionId,
    "ses"
);

define_id!(
    /// Identifies a virtual meeting room.
    RoomId,
    "room"
);
