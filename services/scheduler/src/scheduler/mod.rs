//! Background reconciliation of sessions and rooms.
//!
//! The worker is the only thing that runs passes on its own. It fires on a
//! fixed interval and whenever a mutation wakes it early.

mod worker;

pub use worker::SchedulerWorker;
