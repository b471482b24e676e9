//! `taskdeck` -- workspace-scoped task manager library.
//!
//! The [`session`] decides which workspace is bound, [`tasks`] keeps that
//! workspace's list in step with the store, and [`view`] derives what is
//! shown. [`app::App`] ties the three together for the binary.

pub mod app;
pub mod busy;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod session;
pub mod tasks;
pub mod ui;
pub mod view;
