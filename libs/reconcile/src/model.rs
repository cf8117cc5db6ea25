//! Sessions, rooms and their lifecycle states.

use chrono::{DateTime, Utc};
use classroom_id::{RoomId, SessionId};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScheduleError;

/// Session lifecycle. Ordered so that `max` never moves a session backwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Upcoming,
    Active,
    Expired,
}

impl SessionStatus {
    /// Status of a session with window `[start, end]` at `now`.
    ///
    /// Both ends of the window are inclusive.
    pub fn at(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if now < start {
            Self::Upcoming
        } else if now <= end {
            Self::Active
        } else {
            Self::Expired
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Available,
    InUse,
    /// Never assigned by reconciliation, never left by it either.
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub room_id: Option<RoomId>,
}

impl Session {
    /// Creates a room-less session with its status evaluated at `now`.
    pub fn new(
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ScheduleError::EmptyName("session name"));
        }
        if end < start {
            return Err(ScheduleError::InvalidWindow);
        }

        Ok(Self {
            id: SessionId::new(),
            name,
            start,
            end,
            status: SessionStatus::at(now, start, end),
            room_id: None,
        })
    }

    /// Status at `now`, never earlier than the status already recorded.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        self.status.max(SessionStatus::at(now, self.start, self.end))
    }
}

/// A virtual meeting room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub occupant: Option<SessionId>,
    /// `None` for a room that has never been released; such rooms count as
    /// the longest idle.
    #[serde(default)]
    pub last_released_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Creates an available room after validating its name and URL.
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self, ScheduleError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ScheduleError::EmptyName("room name"));
        }
        let url = validate_room_url(url)?;

        Ok(Self {
            id: RoomId::new(),
            name,
            url,
            status: RoomStatus::Available,
            occupant: None,
            last_released_at: None,
        })
    }

    pub fn is_assignable(&self) -> bool {
        self.status == RoomStatus::Available
    }

    /// Whether the meeting link may be opened, given the status of the
    /// occupying session (if any).
    pub fn is_joinable(&self, occupant_status: Option<SessionStatus>) -> bool {
        self.status != RoomStatus::Maintenance
            && !occupant_status.is_some_and(|status| status.is_expired())
    }

    pub(crate) fn occupy(&mut self, session: SessionId) {
        self.status = RoomStatus::InUse;
        self.occupant = Some(session);
    }

    pub(crate) fn release(&mut self, now: DateTime<Utc>) {
        if self.status == RoomStatus::InUse {
            self.status = RoomStatus::Available;
        }
        self.occupant = None;
        self.last_released_at = Some(now);
    }
}

/// Checks that `raw` is an absolute http(s) URL with a host and returns its
/// trimmed form.
pub fn validate_room_url(raw: &str) -> Result<String, ScheduleError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ScheduleError::InvalidRoomUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rstest::rstest;

    fn base() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[rstest]
    #[case::before_start(-1, SessionStatus::Upcoming)]
    #[case::at_start(0, SessionStatus::Active)]
    #[case::midway(30, SessionStatus::Active)]
    #[case::at_end(60, SessionStatus::Active)]
    #[case::after_end(61, SessionStatus::Expired)]
    fn test_status_window(#[case] offset_mins: i64, #[case] expected: SessionStatus) {
        let start = base();
        let end = start + Duration::minutes(60);
        let now = start + Duration::minutes(offset_mins);
        assert_eq!(SessionStatus::at(now, start, end), expected);
    }

    #[test]
    fn test_active_and_upcoming_scenario() {
        let now = base();
        let a = Session::new(
            "A",
            now - Duration::minutes(10),
            now + Duration::minutes(10),
            now,
        )
        .unwrap();
        let b = Session::new("B", now + Duration::hours(1), now + Duration::hours(2), now).unwrap();

        assert_eq!(a.status, SessionStatus::Active);
        assert_eq!(b.status, SessionStatus::Upcoming);
    }

    #[test]
    fn test_status_never_regresses() {
        let now = base();
        let mut session = Session::new("algebra", now, now + Duration::hours(1), now).unwrap();
        session.status = SessionStatus::Expired;

        // A clock that jumps back does not revive the session.
        assert_eq!(
            session.status_at(now - Duration::hours(1)),
            SessionStatus::Expired
        );
    }

    #[test]
    fn test_session_validation() {
        let now = base();
        assert_eq!(
            Session::new("  ", now, now, now).unwrap_err(),
            ScheduleError::EmptyName("session name")
        );
        assert_eq!(
            Session::new("late", now, now - Duration::minutes(1), now).unwrap_err(),
            ScheduleError::InvalidWindow
        );
    }

    #[rstest]
    #[case("https://meet.example.com/abc-defg-hij", true)]
    #[case("http://zoom.example.org/j/123", true)]
    #[case("  https://meet.example.com/x  ", true)]
    #[case("meet.example.com/abc", false)]
    #[case("ftp://files.example.com/room", false)]
    #[case("mailto:tutor@example.com", false)]
    #[case("", false)]
    fn test_room_url_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_room_url(raw).is_ok(), ok, "{raw}");
    }

    #[test]
    fn test_room_new_trims() {
        let room = Room::new(" Room 1 ", " https://meet.example.com/r1 ").unwrap();
        assert_eq!(room.name, "Room 1");
        assert_eq!(room.url, "https://meet.example.com/r1");
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.last_released_at.is_none());
    }

    #[test]
    fn test_joinable() {
        let mut room = Room::new("r", "https://meet.example.com/r").unwrap();
        assert!(room.is_joinable(None));
        assert!(room.is_joinable(Some(SessionStatus::Active)));
        assert!(!room.is_joinable(Some(SessionStatus::Expired)));

        room.status = RoomStatus::Maintenance;
        assert!(!room.is_joinable(None));
    }

    #[test]
    fn test_release_keeps_maintenance() {
        let now = base();
        let mut room = Room::new("r", "https://meet.example.com/r").unwrap();
        room.status = RoomStatus::Maintenance;
        room.release(now);
        assert_eq!(room.status, RoomStatus::Maintenance);
        assert_eq!(room.last_released_at, Some(now));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::InUse).unwrap(),
            "\"in_use\""
        );
        assert_eq!(
            serde_json::from_str::<SessionStatus>("\"expired\"").unwrap(),
            SessionStatus::Expired
        );
    }

    proptest! {
        #[test]
        fn prop_status_monotonic_in_now(
            start_off in -10_000i64..10_000,
            len in 0i64..10_000,
            t1 in -20_000i64..20_000,
            step in 0i64..20_000,
        ) {
            let start = base() + Duration::seconds(start_off);
            let end = start + Duration::seconds(len);
            let earlier = base() + Duration::seconds(t1);
            let later = earlier + Duration::seconds(step);

            prop_assert!(
                SessionStatus::at(earlier, start, end) <= SessionStatus::at(later, start, end)
            );
        }
    }
}
