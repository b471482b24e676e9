//! Taskdeck store server library.
//!
//! Exposes the in-memory reference task store for use in tests and
//! embedding. The server speaks the JSON contract defined in
//! `taskdeck_proto::api`.

pub mod config;
pub mod server;
pub mod store;
