//! Reconciliation of class sessions and meeting rooms.
//!
//! A [`Schedule`] owns two collections: class sessions and the virtual
//! meeting rooms they run in. A reconciliation pass brings both in line with
//! the wall clock:
//!
//! - **Status**: every session is `upcoming`, `active` or `expired`, derived
//!   from its start/end window.
//! - **Release**: rooms held by expired sessions go back to `available`.
//! - **Assignment**: upcoming sessions without a room are paired, earliest
//!   start first, with the longest-idle available rooms.
//!
//! # Invariants
//!
//! - Passes are idempotent for a fixed `now`
//! - Decisions are deterministic given the same inputs
//! - Session status never moves backwards
//! - A pass is computed in full ([`plan_pass`]) before any of it is applied

mod clock;
mod error;
mod model;
mod pass;
mod schedule;

use std::time::Duration;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{InventoryError, ScheduleError};
pub use model::{validate_room_url, Room, RoomStatus, Session, SessionStatus};
pub use pass::{plan_pass, Assignment, PassPlan, PassReport, Release, StatusChange};
pub use schedule::{Inventory, Schedule};

/// Default interval between reconciliation passes.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(60);
