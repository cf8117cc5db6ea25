//! # classroom-id
//!
//! Typed identifiers for the classroom room scheduler.
//!
//! Every identifier is a ULID behind a short prefix, rendered as
//! `{prefix}_{ulid}`:
//!
//! - `ses_01HV4Z2WQXKJNM8GPQY6VBKC3D` for a class session
//! - `room_01HV4Z3MXNKPQR9HSTZ7WCMD4E` for a meeting room
//!
//! The prefix keeps a room id from ever being accepted where a session id is
//! expected, both in Rust code and at the JSON boundary.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

pub use ulid::Ulid;
