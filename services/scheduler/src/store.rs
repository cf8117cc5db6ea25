//! Single-writer store for the live schedule.
//!
//! All reads and writes go through one mutex, so a reconciliation pass and
//! an admin action can never interleave and no caller ever sees a pass
//! half-applied. The clock is read only once the lock is held.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use classroom_id::{RoomId, SessionId};
use classroom_reconcile::{
    Assignment, Clock, PassReport, Room, Schedule, ScheduleError, Session,
};
use tokio::sync::Mutex;

/// A room together with whether its meeting link may be opened right now.
#[derive(Debug, Clone)]
pub struct RoomEntry {
    pub room: Room,
    pub joinable: bool,
}

struct Guarded {
    schedule: Schedule,
    last_pass: Option<PassReport>,
}

/// Shared handle to the schedule and the clock that drives it.
#[derive(Clone)]
pub struct RoomStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<Guarded>,
    clock: Arc<dyn Clock>,
}

impl RoomStore {
    pub fn new(schedule: Schedule, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(Guarded {
                    schedule,
                    last_pass: None,
                }),
                clock,
            }),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Runs one reconciliation pass at the current time.
    pub async fn reconcile(&self) -> PassReport {
        let mut state = self.inner.state.lock().await;
        let report = state.schedule.reconcile(self.now());
        state.last_pass = Some(report.clone());
        report
    }

    pub async fn last_pass(&self) -> Option<PassReport> {
        self.inner.state.lock().await.last_pass.clone()
    }

    /// Sessions ordered by start time.
    pub async fn sessions(&self) -> Vec<Session> {
        let state = self.inner.state.lock().await;
        let mut sessions: Vec<_> = state.schedule.sessions().cloned().collect();
        sessions.sort_by_key(|s| (s.start, s.id));
        sessions
    }

    pub async fn rooms(&self) -> Vec<RoomEntry> {
        let state = self.inner.state.lock().await;
        let now = self.now();
        state
            .schedule
            .rooms()
            .map(|room| {
                let occupant_status = room
                    .occupant
                    .and_then(|id| state.schedule.session(&id))
                    .map(|s| s.status_at(now));
                RoomEntry {
                    joinable: room.is_joinable(occupant_status),
                    room: room.clone(),
                }
            })
            .collect()
    }

    pub async fn add_session(
        &self,
        name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Session, ScheduleError> {
        let mut state = self.inner.state.lock().await;
        let now = self.now();
        state.schedule.add_session(name, start, end, now)
    }

    pub async fn add_room(&self, name: String, url: &str) -> Result<Room, ScheduleError> {
        self.inner.state.lock().await.schedule.add_room(name, url)
    }

    pub async fn delete_room(&self, id: &RoomId) -> Result<Room, ScheduleError> {
        self.inner.state.lock().await.schedule.delete_room(id)
    }

    pub async fn assign_room(
        &self,
        session_id: SessionId,
        room_id: RoomId,
    ) -> Result<Assignment, ScheduleError> {
        let mut state = self.inner.state.lock().await;
        let now = self.now();
        state.schedule.assign_room(session_id, room_id, now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use classroom_reconcile::{ManualClock, RoomStatus, SessionStatus};

    use super::*;

    fn store() -> (RoomStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (RoomStore::new(Schedule::new(), clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_reconcile_records_last_pass() {
        let (store, _clock) = store();
        assert!(store.last_pass().await.is_none());

        let report = store.reconcile().await;
        assert_eq!(store.last_pass().await, Some(report));
    }

    #[tokio::test]
    async fn test_room_not_joinable_after_session_ends() {
        let (store, clock) = store();
        let now = store.now();
        let room = store
            .add_room("Room 1".into(), "https://meet.example.com/1")
            .await
            .unwrap();
        let session = store
            .add_session(
                "Geometry".into(),
                now + Duration::minutes(5),
                now + Duration::minutes(65),
            )
            .await
            .unwrap();
        store.reconcile().await;

        let entry = store.rooms().await.remove(0);
        assert_eq!(entry.room.status, RoomStatus::InUse);
        assert!(entry.joinable);

        // Past the end but before the next pass: the link is already closed.
        clock.advance(Duration::minutes(70));
        let entry = store.rooms().await.remove(0);
        assert_eq!(entry.room.occupant, Some(session.id));
        assert!(!entry.joinable);
        assert_eq!(
            store.sessions().await[0].status_at(store.now()),
            SessionStatus::Expired
        );

        store.reconcile().await;
        let entry = store.rooms().await.remove(0);
        assert_eq!(entry.room.id, room.id);
        assert_eq!(entry.room.status, RoomStatus::Available);
        assert!(entry.joinable);
    }

    #[tokio::test]
    async fn test_assignment_uses_time_at_lock() {
        let (store, clock) = store();
        let now = store.now();
        let room = store
            .add_room("Room 1".into(), "https://meet.example.com/1")
            .await
            .unwrap();
        let session = store
            .add_session(
                "Physics".into(),
                now + Duration::minutes(5),
                now + Duration::minutes(65),
            )
            .await
            .unwrap();

        // Another writer holds the lock while the class runs out.
        let guard = store.inner.state.lock().await;
        let pending = tokio::spawn({
            let store = store.clone();
            let (session_id, room_id) = (session.id, room.id);
            async move { store.assign_room(session_id, room_id).await }
        });
        tokio::task::yield_now().await;
        clock.advance(Duration::minutes(70));
        drop(guard);

        assert_eq!(
            pending.await.unwrap(),
            Err(ScheduleError::SessionExpired(session.id))
        );
        let entry = store.rooms().await.remove(0);
        assert_eq!(entry.room.status, RoomStatus::Available);
        assert!(entry.room.occupant.is_none());
    }
}
