//! Planning a reconciliation pass.
//!
//! [`plan_pass`] reads a [`Schedule`] and returns everything the pass would
//! change without changing anything. [`Schedule::apply`] then commits the
//! plan in one step, so a half-applied pass is never observable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use classroom_id::{RoomId, SessionId};
use serde::Serialize;

use crate::model::{RoomStatus, SessionStatus};
use crate::schedule::Schedule;

/// A session moving to a later lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub session_id: SessionId,
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// A room handed back by an expired session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Release {
    pub room_id: RoomId,
    pub session_id: SessionId,
}

/// A room given to a waiting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub session_id: SessionId,
    pub room_id: RoomId,
}

/// The full set of updates for one pass, computed at `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPlan {
    pub now: DateTime<Utc>,
    pub status_changes: Vec<StatusChange>,
    pub releases: Vec<Release>,
    pub assignments: Vec<Assignment>,
    /// Upcoming sessions still without a room once the plan is applied.
    pub sessions_waiting: usize,
    /// Assignable rooms still free once the plan is applied.
    pub rooms_idle: usize,
}

impl PassPlan {
    pub fn is_empty(&self) -> bool {
        self.status_changes.is_empty() && self.releases.is_empty() && self.assignments.is_empty()
    }
}

/// Outcome of an applied pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub at: DateTime<Utc>,
    pub sessions_activated: usize,
    pub sessions_expired: usize,
    pub rooms_released: usize,
    pub rooms_assigned: usize,
    pub sessions_waiting: usize,
    pub rooms_idle: usize,
}

impl PassReport {
    /// Returns true if the pass changed any session or room.
    pub fn changed(&self) -> bool {
        self.sessions_activated > 0
            || self.sessions_expired > 0
            || self.rooms_released > 0
            || self.rooms_assigned > 0
    }

    pub(crate) fn from_plan(plan: &PassPlan) -> Self {
        let count_to = |status: SessionStatus| {
            plan.status_changes
                .iter()
                .filter(|change| change.to == status)
                .count()
        };

        Self {
            at: plan.now,
            sessions_activated: count_to(SessionStatus::Active),
            sessions_expired: count_to(SessionStatus::Expired),
            rooms_released: plan.releases.len(),
            rooms_assigned: plan.assignments.len(),
            sessions_waiting: plan.sessions_waiting,
            rooms_idle: plan.rooms_idle,
        }
    }
}

/// Computes one reconciliation pass over `schedule` at `now`.
///
/// 1. Re-derive every session's status.
/// 2. Release rooms held by sessions that are now expired.
/// 3. Pair room-less upcoming sessions (earliest start first) with available
///    rooms (longest idle first, never-released rooms before all others)
///    until either list runs out.
///
/// Ties are broken by id so that the plan is deterministic.
pub fn plan_pass(schedule: &Schedule, now: DateTime<Utc>) -> PassPlan {
    let mut next_status = BTreeMap::new();
    let mut status_changes = Vec::new();

    for session in schedule.sessions() {
        let next = session.status_at(now);
        if next != session.status {
            status_changes.push(StatusChange {
                session_id: session.id,
                from: session.status,
                to: next,
            });
        }
        next_status.insert(session.id, next);
    }

    // Walk rooms rather than sessions so that a room whose occupant has gone
    // missing is released too.
    let mut releases = Vec::new();
    let mut freed = BTreeSet::new();
    for room in schedule.rooms() {
        let Some(session_id) = room.occupant else {
            continue;
        };
        let expired = next_status
            .get(&session_id)
            .is_none_or(SessionStatus::is_expired);
        if expired {
            releases.push(Release {
                room_id: room.id,
                session_id,
            });
            freed.insert(room.id);
        }
    }

    let mut waiting: Vec<_> = schedule
        .sessions()
        .filter(|session| {
            session.room_id.is_none()
                && next_status.get(&session.id) == Some(&SessionStatus::Upcoming)
        })
        .collect();
    waiting.sort_by_key(|session| (session.start, session.id));

    let mut idle: Vec<_> = schedule
        .rooms()
        .filter(|room| {
            room.is_assignable()
                || (freed.contains(&room.id) && room.status == RoomStatus::InUse)
        })
        .map(|room| {
            let released_at = if freed.contains(&room.id) {
                Some(now)
            } else {
                room.last_released_at
            };
            (released_at, room.id)
        })
        .collect();
    idle.sort();

    let assignments: Vec<_> = waiting
        .iter()
        .zip(idle.iter())
        .map(|(session, (_, room_id))| Assignment {
            session_id: session.id,
            room_id: *room_id,
        })
        .collect();

    PassPlan {
        now,
        sessions_waiting: waiting.len() - assignments.len(),
        rooms_idle: idle.len() - assignments.len(),
        status_changes,
        releases,
        assignments,
    }
}
