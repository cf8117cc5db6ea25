//! The session and room collections, and every mutation allowed on them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use classroom_id::{RoomId, SessionId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InventoryError, ScheduleError};
use crate::model::{validate_room_url, Room, RoomStatus, Session, SessionStatus};
use crate::pass::{plan_pass, Assignment, PassPlan, PassReport};

/// Initial sessions and rooms, as supplied by the class-listing and
/// room-inventory providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// Sessions and rooms, kept mutually consistent.
///
/// Sessions hold at most one room and rooms hold at most one session; the
/// two sides always point at each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    sessions: BTreeMap<SessionId, Session>,
    rooms: BTreeMap<RoomId, Room>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from an inventory, rejecting duplicates and
    /// inconsistent occupancy.
    ///
    /// Stored session statuses are not trusted: each one is re-derived from
    /// the session window at `now`.
    pub fn from_inventory(
        inventory: Inventory,
        now: DateTime<Utc>,
    ) -> Result<Self, InventoryError> {
        let mut schedule = Self::new();

        for mut session in inventory.sessions {
            if session.end < session.start {
                return Err(InventoryError::InvalidWindow(session.id));
            }
            let derived = SessionStatus::at(now, session.start, session.end);
            if derived != session.status {
                debug!(
                    session_id = %session.id,
                    stored = %session.status,
                    derived = %derived,
                    "Stored session status replaced"
                );
                session.status = derived;
            }
            let id = session.id;
            if schedule.sessions.insert(id, session).is_some() {
                return Err(InventoryError::DuplicateSession(id));
            }
        }

        for room in inventory.rooms {
            validate_room_url(&room.url)
                .map_err(|source| InventoryError::InvalidRoom { room: room.id, source })?;
            let id = room.id;
            if schedule.rooms.insert(id, room).is_some() {
                return Err(InventoryError::DuplicateRoom(id));
            }
        }

        schedule.check_invariants()?;
        Ok(schedule)
    }

    /// Returns the current collections as an inventory.
    pub fn to_inventory(&self) -> Inventory {
        Inventory {
            sessions: self.sessions.values().cloned().collect(),
            rooms: self.rooms.values().cloned().collect(),
        }
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Checks that occupancy is consistent in both directions.
    pub fn check_invariants(&self) -> Result<(), InventoryError> {
        for room in self.rooms.values() {
            match (room.status, room.occupant) {
                (RoomStatus::InUse, None) => {
                    return Err(InventoryError::InUseWithoutOccupant(room.id));
                }
                (RoomStatus::Available | RoomStatus::Maintenance, Some(session)) => {
                    return Err(InventoryError::UnexpectedOccupant {
                        room: room.id,
                        status: room.status.as_str(),
                        session,
                    });
                }
                (RoomStatus::InUse, Some(session_id)) => {
                    let Some(session) = self.sessions.get(&session_id) else {
                        return Err(InventoryError::UnknownSession {
                            room: room.id,
                            session: session_id,
                        });
                    };
                    if session.room_id != Some(room.id) {
                        return Err(InventoryError::OccupancyMismatch {
                            session: session_id,
                            room: room.id,
                        });
                    }
                }
                _ => {}
            }
        }

        for session in self.sessions.values() {
            let Some(room_id) = session.room_id else {
                continue;
            };
            let Some(room) = self.rooms.get(&room_id) else {
                return Err(InventoryError::UnknownRoom {
                    session: session.id,
                    room: room_id,
                });
            };
            if room.occupant != Some(session.id) {
                return Err(InventoryError::OccupancyMismatch {
                    session: session.id,
                    room: room_id,
                });
            }
        }

        Ok(())
    }

    /// Runs one full reconciliation pass at `now`.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> PassReport {
        let plan = plan_pass(self, now);
        self.apply(plan)
    }

    /// Commits a plan produced by [`plan_pass`] against this schedule.
    pub fn apply(&mut self, plan: PassPlan) -> PassReport {
        let report = PassReport::from_plan(&plan);

        for change in &plan.status_changes {
            if let Some(session) = self.sessions.get_mut(&change.session_id) {
                debug!(
                    session_id = %change.session_id,
                    from = %change.from,
                    to = %change.to,
                    "Session status changed"
                );
                session.status = change.to;
            }
        }

        for release in &plan.releases {
            if let Some(room) = self.rooms.get_mut(&release.room_id) {
                room.release(plan.now);
            }
            if let Some(session) = self.sessions.get_mut(&release.session_id) {
                if session.room_id == Some(release.room_id) {
                    session.room_id = None;
                }
            }
            debug!(room_id = %release.room_id, session_id = %release.session_id, "Room released");
        }

        for assignment in &plan.assignments {
            self.link(assignment.session_id, assignment.room_id);
            debug!(
                room_id = %assignment.room_id,
                session_id = %assignment.session_id,
                "Room assigned"
            );
        }

        report
    }

    /// Adds a session created by the booking workflow.
    pub fn add_session(
        &mut self,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Session, ScheduleError> {
        let session = Session::new(name, start, end, now)?;
        if self.sessions.contains_key(&session.id) {
            return Err(ScheduleError::DuplicateId(session.id.to_string()));
        }
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    /// Adds an available room.
    pub fn add_room(&mut self, name: impl Into<String>, url: &str) -> Result<Room, ScheduleError> {
        let room = Room::new(name, url)?;
        if self.rooms.contains_key(&room.id) {
            return Err(ScheduleError::DuplicateId(room.id.to_string()));
        }
        self.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    /// Removes a room. Rooms in use are kept.
    pub fn delete_room(&mut self, id: &RoomId) -> Result<Room, ScheduleError> {
        let room = self.rooms.get(id).ok_or(ScheduleError::RoomNotFound(*id))?;
        if room.status == RoomStatus::InUse {
            return Err(ScheduleError::RoomInUse(*id));
        }
        self.rooms.remove(id).ok_or(ScheduleError::RoomNotFound(*id))
    }

    /// Puts `session_id` into `room_id`, outside of the greedy pass.
    ///
    /// Any room the session held before is released at `now`. A room whose
    /// occupant has already expired is taken over.
    pub fn assign_room(
        &mut self,
        session_id: SessionId,
        room_id: RoomId,
        now: DateTime<Utc>,
    ) -> Result<Assignment, ScheduleError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(ScheduleError::SessionNotFound(session_id))?;
        if session.status_at(now).is_expired() {
            return Err(ScheduleError::SessionExpired(session_id));
        }
        let previous = session.room_id;

        let room = self
            .rooms
            .get(&room_id)
            .ok_or(ScheduleError::RoomNotFound(room_id))?;
        if room.status == RoomStatus::Maintenance {
            return Err(ScheduleError::RoomUnavailable(room_id));
        }

        let assignment = Assignment {
            session_id,
            room_id,
        };
        if previous == Some(room_id) {
            return Ok(assignment);
        }

        let displaced = match room.occupant {
            Some(other) => {
                let other_live = self
                    .sessions
                    .get(&other)
                    .is_some_and(|s| !s.status_at(now).is_expired());
                if other_live {
                    return Err(ScheduleError::RoomOccupied {
                        room: room_id,
                        session: other,
                    });
                }
                Some(other)
            }
            None => None,
        };

        // Validation is done; everything below mutates.
        if let Some(other) = displaced {
            self.unlink(other, room_id, now);
        }
        if let Some(previous) = previous {
            self.unlink(session_id, previous, now);
        }
        self.link(session_id, room_id);

        debug!(%session_id, %room_id, ?previous, "Room assigned manually");
        Ok(assignment)
    }

    fn link(&mut self, session_id: SessionId, room_id: RoomId) {
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.occupy(session_id);
        }
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.room_id = Some(room_id);
        }
    }

    fn unlink(&mut self, session_id: SessionId, room_id: RoomId, now: DateTime<Utc>) {
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.release(now);
        }
        if let Some(session) = self.sessions.get_mut(&session_id) {
            if session.room_id == Some(room_id) {
                session.room_id = None;
            }
        }
    }
}
