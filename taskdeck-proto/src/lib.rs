//! Shared wire definitions for the Taskdeck task store contract.

pub mod api;
pub mod task;
pub mod workspace;
