//! Classroom room scheduler service.
//!
//! This crate ships the `room-scheduler` binary, and exposes a library
//! surface so the HTTP API and the worker can be driven from tests.

pub mod api;
pub mod config;
pub mod inventory;
pub mod scheduler;
pub mod state;
pub mod store;
